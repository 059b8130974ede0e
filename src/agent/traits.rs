use ndarray::{Array1, ArrayView1};

use crate::error::Result;

/// Capability the agent needs from its action-value approximator.
///
/// Implementations own their parameters; the agent never inspects them.
pub trait ActionValueModel {
    /// Estimated value of every action in `state`, one entry per action.
    fn predict(&mut self, state: ArrayView1<f32>) -> Result<Array1<f32>>;

    /// One optimizer step pulling the output for `state` towards `target`.
    fn fit(&mut self, state: ArrayView1<f32>, target: ArrayView1<f32>) -> Result<()>;
}

/// Builds an [`ActionValueModel`] for a given input and output width.
pub trait ModelFactory {
    type Model: ActionValueModel;

    fn build(self, observation_size: usize, action_count: usize) -> Result<Self::Model>;
}

impl<F, M> ModelFactory for F
where
    F: FnOnce(usize, usize) -> Result<M>,
    M: ActionValueModel,
{
    type Model = M;

    fn build(self, observation_size: usize, action_count: usize) -> Result<M> {
        self(observation_size, action_count)
    }
}
