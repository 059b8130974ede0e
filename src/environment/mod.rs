//! Synchronous interface to the simulation the agent acts in.

pub mod cartpole;

pub use cartpole::CartPole;

use ndarray::Array1;

use crate::error::Result;

/// Outcome of a single environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub observation: Array1<f32>,
    pub reward: f32,
    pub done: bool,
}

/// A blocking simulation environment with a discrete action space.
pub trait Environment {
    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Result<Array1<f32>>;

    /// Apply `action` and advance the simulation by one step.
    fn step(&mut self, action: usize) -> Result<Step>;

    fn observation_space_size(&self) -> usize;

    fn action_space_size(&self) -> usize;
}
