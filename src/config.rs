//! Configuration of the agent, its Q-network backend and the training loop.
//!
//! Every struct has a [`Default`] carrying the reference hyperparameters and
//! builder-style setters. [`Config`] bundles all three and can be stored as JSON.
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::loss::LossKind;
use crate::optimizer::OptimizerKind;

/// Hyperparameters of [`DqnAgent`](crate::agent::DqnAgent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Discount factor applied to the bootstrapped next-state value.
    pub gamma: f32,

    /// Initial exploration rate.
    pub epsilon: f32,

    /// Floor below which the exploration rate never decays.
    pub epsilon_min: f32,

    /// Multiplier applied to the exploration rate after each training step.
    pub epsilon_decay: f32,

    /// Number of transitions kept in replay memory.
    pub memory_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            gamma: 0.95,
            epsilon: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            memory_capacity: 2000,
        }
    }
}

impl AgentConfig {
    pub fn gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn epsilon_min(mut self, epsilon_min: f32) -> Self {
        self.epsilon_min = epsilon_min;
        self
    }

    pub fn epsilon_decay(mut self, epsilon_decay: f32) -> Self {
        self.epsilon_decay = epsilon_decay;
        self
    }

    pub fn memory_capacity(mut self, memory_capacity: usize) -> Self {
        self.memory_capacity = memory_capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(DqnError::invalid_parameter("gamma", "must lie in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(DqnError::invalid_parameter("epsilon", "must lie in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.epsilon_min) {
            return Err(DqnError::invalid_parameter("epsilon_min", "must lie in [0, 1]"));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay < 1.0) {
            return Err(DqnError::invalid_parameter("epsilon_decay", "must lie in (0, 1)"));
        }
        if self.memory_capacity == 0 {
            return Err(DqnError::invalid_parameter("memory_capacity", "must be greater than 0"));
        }
        Ok(())
    }
}

/// Architecture and optimizer of the built-in [`QNetwork`](crate::q_network::QNetwork).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Widths of the hidden layers, input to output.
    pub hidden_layers: Vec<usize>,

    /// Activation of every hidden layer. The output layer is always linear.
    pub hidden_activation: Activation,

    pub learning_rate: f32,

    pub optimizer: OptimizerKind,

    pub loss: LossKind,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![24, 24],
            hidden_activation: Activation::Tanh,
            learning_rate: 0.001,
            optimizer: OptimizerKind::default(),
            loss: LossKind::Mse,
        }
    }
}

impl ModelConfig {
    pub fn hidden_layers(mut self, hidden_layers: &[usize]) -> Self {
        self.hidden_layers = hidden_layers.to_vec();
        self
    }

    pub fn hidden_activation(mut self, activation: Activation) -> Self {
        self.hidden_activation = activation;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn loss(mut self, loss: LossKind) -> Self {
        self.loss = loss;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.hidden_layers.iter().any(|&width| width == 0) {
            return Err(DqnError::invalid_parameter("hidden_layers", "widths must be greater than 0"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(DqnError::invalid_parameter("learning_rate", "must be a positive finite number"));
        }
        Ok(())
    }
}

/// When the training loop asks the agent for a training step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrainInterval {
    /// Once after every finished episode.
    #[default]
    Episode,

    /// After every environment step.
    Step,
}

/// Configuration of [`Trainer`](crate::trainer::Trainer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Maximum number of training episodes.
    pub episodes: usize,

    /// Number of transitions replayed per training step.
    pub batch_size: usize,

    pub train_interval: TrainInterval,

    /// Episodes are cut off after this many steps, if set.
    pub max_steps_per_episode: Option<usize>,

    /// Number of recent episode scores averaged for the solved check.
    pub score_window: usize,

    /// Training stops once the windowed mean score reaches this value.
    pub solved_threshold: f32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            batch_size: 32,
            train_interval: TrainInterval::Episode,
            max_steps_per_episode: Some(500),
            score_window: 100,
            solved_threshold: 195.0,
        }
    }
}

impl TrainingConfig {
    pub fn episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn train_interval(mut self, train_interval: TrainInterval) -> Self {
        self.train_interval = train_interval;
        self
    }

    pub fn max_steps_per_episode(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps_per_episode = max_steps;
        self
    }

    pub fn score_window(mut self, score_window: usize) -> Self {
        self.score_window = score_window;
        self
    }

    pub fn solved_threshold(mut self, solved_threshold: f32) -> Self {
        self.solved_threshold = solved_threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DqnError::invalid_parameter("batch_size", "must be greater than 0"));
        }
        if self.score_window == 0 {
            return Err(DqnError::invalid_parameter("score_window", "must be greater than 0"));
        }
        if self.max_steps_per_episode == Some(0) {
            return Err(DqnError::invalid_parameter("max_steps_per_episode", "must be greater than 0"));
        }
        Ok(())
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub model: ModelConfig,
    pub training: TrainingConfig,

    /// Seed for every random source of the run; entropy when unset.
    pub seed: Option<u64>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.agent.validate()?;
        self.model.validate()?;
        self.training.validate()
    }

    /// Constructs [`Config`] from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config: Self = serde_json::from_reader(rdr)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves [`Config`] as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        Ok(())
    }
}
