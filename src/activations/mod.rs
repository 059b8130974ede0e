//! # Activation Functions Module
//!
//! Elementwise nonlinearities applied by the dense layers of the Q-network.
//!
//! ## Available Activations
//!
//! - **ReLU**: `max(0, x)`
//! - **Sigmoid**: `1 / (1 + e^(-x))`, outputs between 0 and 1
//! - **Tanh**: hyperbolic tangent, outputs between -1 and 1
//! - **Linear**: identity, used for the output layer since action-values are unbounded
//!
//! ## Usage Example
//!
//! ```rust
//! use cartpole_dqn::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5, 0.0, 2.0]];
//! Activation::Relu.apply_batch(&mut data);
//! assert_eq!(data, array![[1.0, 0.0, 0.0, 2.0]]);
//! ```

pub mod functions;

pub use functions::Activation;
