use ndarray::{Array1, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activations::Activation;
use crate::agent::traits::{ActionValueModel, ModelFactory};
use crate::config::ModelConfig;
use crate::error::{DqnError, Result};
use crate::loss::Loss;
use crate::network::NeuralNetwork;

/// Built-in action-value model: a dense network trained one sample at a time.
pub struct QNetwork {
    network: NeuralNetwork,
    loss: Box<dyn Loss>,
    learning_rate: f32,
    last_loss: Option<f32>,
}

impl QNetwork {
    /// Build a network `observation_size -> hidden... -> action_count` with a
    /// linear output layer.
    pub fn new(observation_size: usize, action_count: usize, config: &ModelConfig, rng: &mut StdRng) -> Result<Self> {
        config.validate()?;
        if observation_size == 0 {
            return Err(DqnError::invalid_parameter("observation_size", "must be greater than 0"));
        }
        if action_count == 0 {
            return Err(DqnError::invalid_parameter("action_count", "must be greater than 0"));
        }

        let mut layer_sizes = Vec::with_capacity(config.hidden_layers.len() + 2);
        layer_sizes.push(observation_size);
        layer_sizes.extend_from_slice(&config.hidden_layers);
        layer_sizes.push(action_count);

        let mut activations = vec![config.hidden_activation; config.hidden_layers.len()];
        activations.push(Activation::Linear);

        let network = NeuralNetwork::new(&layer_sizes, &activations, config.optimizer, rng)?;

        Ok(QNetwork {
            network,
            loss: config.loss.build(),
            learning_rate: config.learning_rate,
            last_loss: None,
        })
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    /// Loss of the most recent `fit` call, measured before the update.
    pub fn last_loss(&self) -> Option<f32> {
        self.last_loss
    }
}

impl ActionValueModel for QNetwork {
    fn predict(&mut self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.network.predict(state)
    }

    fn fit(&mut self, state: ArrayView1<f32>, target: ArrayView1<f32>) -> Result<()> {
        let loss = self.network.train_minibatch(
            state.insert_axis(Axis(0)),
            target.insert_axis(Axis(0)),
            self.loss.as_ref(),
            self.learning_rate,
        )?;
        self.last_loss = Some(loss);
        Ok(())
    }
}

/// [`ModelFactory`] producing [`QNetwork`]s from a [`ModelConfig`].
pub struct QNetworkFactory {
    config: ModelConfig,
    rng: StdRng,
}

impl QNetworkFactory {
    pub fn new(config: ModelConfig) -> Self {
        QNetworkFactory {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Draw initial weights from a seeded generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl ModelFactory for QNetworkFactory {
    type Model = QNetwork;

    fn build(mut self, observation_size: usize, action_count: usize) -> Result<QNetwork> {
        QNetwork::new(observation_size, action_count, &self.config, &mut self.rng)
    }
}
