//! # cartpole-dqn - Deep Q-Network agent for cart-pole balancing
//!
//! A DQN agent with bounded experience replay, epsilon-greedy exploration and
//! temporal-difference targets, plus a small ndarray Q-network backend and an
//! in-process cart-pole simulation to train it on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cartpole_dqn::agent::DqnAgent;
//! use cartpole_dqn::config::Config;
//! use cartpole_dqn::environment::{CartPole, Environment};
//! use cartpole_dqn::q_network::QNetworkFactory;
//! use cartpole_dqn::trainer::Trainer;
//!
//! let config = Config::default();
//! let mut env = CartPole::with_seed(0);
//! let factory = QNetworkFactory::new(config.model.clone()).seed(0);
//! let mut agent = DqnAgent::with_seed(
//!     env.observation_space_size(),
//!     env.action_space_size(),
//!     config.agent.clone(),
//!     factory,
//!     0,
//! ).unwrap();
//!
//! let summary = Trainer::new(config.training).unwrap().train(&mut env, &mut agent).unwrap();
//! println!("solved at {:?}", summary.solved_at);
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`] - the DQN agent and the model capability traits
//! - [`replay_buffer`] - transitions and the bounded replay memory
//! - [`ring_buffer`] - generic fixed-capacity FIFO buffer
//! - [`q_network`] - built-in action-value model
//! - [`network`], [`layers`], [`activations`], [`loss`], [`optimizer`] - the dense network behind it
//! - [`environment`] - environment interface and the cart-pole simulation
//! - [`trainer`] - episode loop and greedy evaluation
//! - [`metrics`] - windowed episode scores
//! - [`config`] - serde configuration
//! - [`error`] - error type and result alias

pub mod activations;
pub mod agent;
pub mod config;
pub mod environment;
pub mod error;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod q_network;
pub mod replay_buffer;
pub mod ring_buffer;
pub mod trainer;

#[cfg(test)]
mod tests;
