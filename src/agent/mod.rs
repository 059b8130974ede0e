//! # Agent Module
//!
//! The Deep Q-Network agent and the capability traits it uses to reach its
//! action-value model.
//!
//! ## Core Concepts
//!
//! - **Exploration vs Exploitation**: epsilon-greedy action selection with a
//!   multiplicative decay after every replayed batch, floored at `epsilon_min`
//! - **Experience Replay**: transitions are stored in a bounded FIFO memory and
//!   replayed in uniformly sampled batches
//! - **Temporal-difference targets**: `reward` for terminal transitions,
//!   `reward + gamma * max_a Q(next_state, a)` otherwise
//!
//! Any type implementing [`ActionValueModel`] can back the agent; the built-in
//! [`QNetwork`](crate::q_network::QNetwork) is one such backend.

pub mod traits;

mod dqn;
pub use dqn::{DqnAgent, TrainOutcome};
pub use traits::{ActionValueModel, ModelFactory};
