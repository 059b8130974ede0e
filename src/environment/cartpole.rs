use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

use crate::error::{DqnError, Result};
use super::{Environment, Step};

// Episode termination limits.
const X_THRESHOLD: f32 = 2.4;
const THETA_THRESHOLD_RADIANS: f32 = 12.0 * 2.0 * PI / 360.0;

/// Half-width of the uniform range every state component is reset into.
const RESET_NOISE: f32 = 0.05;

/// Classic cart-pole balancing task.
///
/// Observations are `[x, x_dot, theta, theta_dot]`. Action `1` pushes the cart
/// right, action `0` pushes it left. Every step that keeps the pole up earns a
/// reward of `1`; the step that ends the episode earns `0`.
#[derive(Debug)]
pub struct CartPole<R: Rng = StdRng> {
    x: f32,
    x_dot: f32,
    theta: f32,
    theta_dot: f32,

    gravity: f32,
    mass_cart: f32,
    mass_pole: f32,
    length: f32, // half the pole's length
    force_mag: f32,
    tau: f32,

    rng: R,
}

impl CartPole<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for CartPole<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> CartPole<R> {
    pub fn with_rng(rng: R) -> Self {
        CartPole {
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length: 0.5,
            force_mag: 10.0,
            tau: 0.02,
            rng,
        }
    }

    /// Set the internal state directly, e.g. to replay a known situation.
    pub fn set_state(&mut self, x: f32, x_dot: f32, theta: f32, theta_dot: f32) {
        self.x = x;
        self.x_dot = x_dot;
        self.theta = theta;
        self.theta_dot = theta_dot;
    }

    fn observation(&self) -> Array1<f32> {
        array![self.x, self.x_dot, self.theta, self.theta_dot]
    }

    fn is_done(&self) -> bool {
        self.x < -X_THRESHOLD
            || self.x > X_THRESHOLD
            || self.theta < -THETA_THRESHOLD_RADIANS
            || self.theta > THETA_THRESHOLD_RADIANS
    }
}

impl<R: Rng> Environment for CartPole<R> {
    fn reset(&mut self) -> Result<Array1<f32>> {
        self.x = self.rng.gen_range(-RESET_NOISE..=RESET_NOISE);
        self.x_dot = self.rng.gen_range(-RESET_NOISE..=RESET_NOISE);
        self.theta = self.rng.gen_range(-RESET_NOISE..=RESET_NOISE);
        self.theta_dot = self.rng.gen_range(-RESET_NOISE..=RESET_NOISE);
        Ok(self.observation())
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        let force = match action {
            0 => -self.force_mag,
            1 => self.force_mag,
            _ => {
                return Err(DqnError::InvalidAction {
                    action,
                    max_actions: self.action_space_size(),
                })
            }
        };

        let cos_theta = self.theta.cos();
        let sin_theta = self.theta.sin();
        let total_mass = self.mass_cart + self.mass_pole;
        let pole_mass_length = self.mass_pole * self.length;

        let temp = (force + pole_mass_length * self.theta_dot * self.theta_dot * sin_theta) / total_mass;
        let theta_acc = (self.gravity * sin_theta - cos_theta * temp)
            / (self.length * (4.0 / 3.0 - self.mass_pole * cos_theta * cos_theta / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        // Explicit Euler: positions advance with the velocities from before this step.
        self.x += self.tau * self.x_dot;
        self.x_dot += self.tau * x_acc;
        self.theta += self.tau * self.theta_dot;
        self.theta_dot += self.tau * theta_acc;

        let done = self.is_done();
        let reward = if done { 0.0 } else { 1.0 };

        Ok(Step {
            observation: self.observation(),
            reward,
            done,
        })
    }

    fn observation_space_size(&self) -> usize {
        4
    }

    fn action_space_size(&self) -> usize {
        2
    }
}
