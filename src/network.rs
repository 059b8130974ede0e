use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::layers::{DenseLayer, WeightInit};
use crate::loss::Loss;
use crate::optimizer::{Optimizer, OptimizerKind, OptimizerWrapper};

/// A feed-forward neural network made of dense layers and an optimizer.
#[derive(Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
}

impl NeuralNetwork {
    /// Create a network with the given layer sizes and one activation per layer.
    ///
    /// `layer_sizes` includes the input and output widths, so it must be one
    /// element longer than `activations`. Weights are initialized according to
    /// each layer's activation and drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: OptimizerKind,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(DqnError::invalid_parameter(
                "layer_sizes",
                "Network must have at least input and output layers",
            ));
        }
        if layer_sizes.len() - 1 != activations.len() {
            return Err(DqnError::invalid_parameter(
                "activations",
                "Number of activations must match number of layers - 1",
            ));
        }
        if let Some(position) = layer_sizes.iter().position(|&size| size == 0) {
            return Err(DqnError::invalid_parameter(
                "layer_sizes".to_string(),
                format!("layer {} has zero width", position),
            ));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| {
                DenseLayer::new(window[0], window[1], activation, WeightInit::for_activation(activation), rng)
            })
            .collect::<Vec<_>>();
        let optimizer = optimizer.build(&layers);

        Ok(NeuralNetwork { layers, optimizer })
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    /// Forward pass for a single input vector. Does not touch training caches.
    pub fn predict(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.check_input(input.len())?;
        let output = self.predict_batch(input.insert_axis(Axis(0)));
        Ok(output.index_axis_move(Axis(0), 0))
    }

    /// Forward pass for a batch of input rows.
    pub fn predict_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            current_output = layer.predict_batch(current_output.view());
        }
        current_output
    }

    fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current_output = inputs.to_owned();
        for layer in &mut self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        current_output
    }

    /// Backpropagate `output_errors` (dLoss/dOutput) through every layer.
    fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<Vec<(Array2<f32>, Array1<f32>)>> {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for (i, layer) in self.layers.iter().enumerate().rev() {
            let (adjusted_error, weight_gradients, bias_gradients) = layer
                .backward_batch(current_error.view())
                .ok_or_else(|| DqnError::NumericalError("backward pass without a recorded forward pass".to_string()))?;
            gradients.push((weight_gradients, bias_gradients));

            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
        }

        gradients.reverse();
        Ok(gradients)
    }

    /// One optimizer step on a batch; returns the loss before the update.
    pub fn train_minibatch(
        &mut self,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        loss: &dyn Loss,
        learning_rate: f32,
    ) -> Result<f32> {
        if inputs.ncols() != self.input_size() {
            return Err(DqnError::dimension_mismatch(
                format!("{} input columns", self.input_size()),
                format!("{}", inputs.ncols()),
            ));
        }
        if targets.dim() != (inputs.nrows(), self.output_size()) {
            return Err(DqnError::dimension_mismatch(
                format!("targets of shape {:?}", (inputs.nrows(), self.output_size())),
                format!("{:?}", targets.dim()),
            ));
        }

        let outputs = self.forward_batch(inputs);
        let value = loss.compute_batch(outputs.view(), targets);
        if !value.is_finite() {
            return Err(DqnError::NumericalError(format!("non-finite loss {}", value)));
        }

        let output_errors = loss.gradient_batch(outputs.view(), targets);
        let gradients = self.backward_batch(output_errors.view())?;

        for (index, (layer, (weight_gradients, bias_gradients))) in self.layers.iter_mut().zip(gradients).enumerate() {
            self.optimizer.update_weights(index, &mut layer.weights, &weight_gradients, learning_rate);
            self.optimizer.update_biases(index, &mut layer.biases, &bias_gradients, learning_rate);
        }
        self.optimizer.end_step();

        Ok(value)
    }

    fn check_input(&self, len: usize) -> Result<()> {
        if len != self.input_size() {
            return Err(DqnError::dimension_mismatch(
                format!("state of length {}", self.input_size()),
                format!("{}", len),
            ));
        }
        Ok(())
    }
}
