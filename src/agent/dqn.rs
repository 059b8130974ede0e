use log::{debug, trace};
use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AgentConfig;
use crate::error::{DqnError, Result};
use crate::replay_buffer::{ReplayMemory, Transition};
use super::traits::{ActionValueModel, ModelFactory};

/// What a call to [`DqnAgent::train`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainOutcome {
    /// Memory held fewer transitions than the batch size; nothing changed.
    Skipped,

    /// A batch was replayed and the exploration rate decayed to `epsilon`.
    Decayed { epsilon: f32 },

    /// A batch was replayed and the exploration rate sits at its floor.
    FloorReached,
}

/// Deep Q-Network agent with experience replay and epsilon-greedy exploration.
///
/// The agent owns its replay memory and its action-value model. Randomness is
/// drawn from two injectable generators: one for exploration, one owned by the
/// replay memory for batch sampling.
///
/// # Example
///
/// ```rust
/// use cartpole_dqn::agent::DqnAgent;
/// use cartpole_dqn::config::{AgentConfig, ModelConfig};
/// use cartpole_dqn::q_network::QNetworkFactory;
/// use ndarray::array;
///
/// let factory = QNetworkFactory::new(ModelConfig::default()).seed(1);
/// let mut agent = DqnAgent::with_seed(4, 2, AgentConfig::default(), factory, 1).unwrap();
///
/// let state = array![0.01, -0.02, 0.03, 0.0];
/// let action = agent.select_action(state.view()).unwrap();
/// assert!(action < 2);
///
/// agent.remember(state.clone(), action, 1.0, state, false).unwrap();
/// agent.train(32).unwrap(); // skipped: only one transition stored
/// assert_eq!(agent.epsilon(), 1.0);
/// ```
pub struct DqnAgent<M: ActionValueModel, R: Rng = StdRng> {
    observation_size: usize,
    action_count: usize,
    config: AgentConfig,
    epsilon: f32,
    memory: ReplayMemory<R>,
    model: M,
    rng: R,
    train_steps: usize,
}

impl<M: ActionValueModel> DqnAgent<M, StdRng> {
    /// Create an agent whose random sources are seeded from system entropy.
    pub fn new<F>(observation_size: usize, action_count: usize, config: AgentConfig, factory: F) -> Result<Self>
    where
        F: ModelFactory<Model = M>,
    {
        let mut rng = StdRng::from_entropy();
        let memory_rng = StdRng::seed_from_u64(rng.gen());
        Self::with_rngs(observation_size, action_count, config, factory, rng, memory_rng)
    }

    /// Create an agent whose exploration and sampling are reproducible from `seed`.
    pub fn with_seed<F>(observation_size: usize, action_count: usize, config: AgentConfig, factory: F, seed: u64) -> Result<Self>
    where
        F: ModelFactory<Model = M>,
    {
        let mut rng = StdRng::seed_from_u64(seed);
        let memory_rng = StdRng::seed_from_u64(rng.gen());
        Self::with_rngs(observation_size, action_count, config, factory, rng, memory_rng)
    }
}

impl<M: ActionValueModel, R: Rng> DqnAgent<M, R> {
    /// Create an agent with explicit random sources.
    ///
    /// Fails with [`DqnError::InvalidParameter`] when either dimension is zero
    /// or the config is out of range; the model factory is not called then.
    pub fn with_rngs<F>(
        observation_size: usize,
        action_count: usize,
        config: AgentConfig,
        factory: F,
        exploration_rng: R,
        memory_rng: R,
    ) -> Result<Self>
    where
        F: ModelFactory<Model = M>,
    {
        if observation_size == 0 {
            return Err(DqnError::invalid_parameter("observation_size", "must be greater than 0"));
        }
        if action_count == 0 {
            return Err(DqnError::invalid_parameter("action_count", "must be greater than 0"));
        }
        config.validate()?;

        let model = factory.build(observation_size, action_count)?;

        Ok(DqnAgent {
            observation_size,
            action_count,
            epsilon: config.epsilon,
            memory: ReplayMemory::with_rng(config.memory_capacity, memory_rng)?,
            config,
            model,
            rng: exploration_rng,
            train_steps: 0,
        })
    }

    /// Epsilon-greedy action selection.
    ///
    /// With probability epsilon a uniformly random action is returned without
    /// consulting the model; otherwise the action with the highest predicted
    /// value, ties going to the lowest index.
    pub fn select_action(&mut self, state: ArrayView1<f32>) -> Result<usize> {
        self.check_state(state.len())?;

        if self.rng.gen::<f32>() < self.epsilon {
            return Ok(self.rng.gen_range(0..self.action_count));
        }

        let q_values = checked_predict(&mut self.model, state, self.action_count)?;
        argmax(&q_values)
    }

    /// Store one transition in replay memory.
    ///
    /// Transitions with an out-of-range action or states of the wrong length
    /// are rejected and memory is left unchanged.
    pub fn remember(
        &mut self,
        state: Array1<f32>,
        action: usize,
        reward: f32,
        next_state: Array1<f32>,
        terminal: bool,
    ) -> Result<()> {
        if action >= self.action_count {
            return Err(DqnError::InvalidAction {
                action,
                max_actions: self.action_count,
            });
        }
        self.check_state(state.len())?;
        self.check_state(next_state.len())?;

        self.memory.append(Transition {
            state,
            action,
            reward,
            next_state,
            terminal,
        });
        Ok(())
    }

    /// Replay `batch_size` stored transitions, fitting the model once per transition.
    ///
    /// Does nothing when memory holds fewer than `batch_size` transitions.
    /// After a replayed batch the exploration rate decays towards its floor.
    /// Model errors are returned as-is; the batch is abandoned and epsilon is
    /// left untouched.
    pub fn train(&mut self, batch_size: usize) -> Result<TrainOutcome> {
        if batch_size == 0 {
            return Err(DqnError::invalid_parameter("batch_size", "must be greater than 0"));
        }
        if self.memory.size() < batch_size {
            trace!("skipping training: {} of {} transitions stored", self.memory.size(), batch_size);
            return Ok(TrainOutcome::Skipped);
        }

        let gamma = self.config.gamma;
        let action_count = self.action_count;
        let batch = self.memory.sample(batch_size)?;

        for transition in batch {
            let mut target_values = checked_predict(&mut self.model, transition.state.view(), action_count)?;
            let target = if transition.terminal {
                transition.reward
            } else {
                let next_values = checked_predict(&mut self.model, transition.next_state.view(), action_count)?;
                transition.reward + gamma * max_value(&next_values)
            };
            trace!("action {} target {} (was {})", transition.action, target, target_values[transition.action]);

            target_values[transition.action] = target;
            self.model.fit(transition.state.view(), target_values.view())?;
        }

        self.train_steps += 1;
        Ok(self.decay_epsilon())
    }

    fn check_state(&self, len: usize) -> Result<()> {
        if len != self.observation_size {
            return Err(DqnError::dimension_mismatch(
                format!("state of length {}", self.observation_size),
                format!("{}", len),
            ));
        }
        Ok(())
    }

    fn decay_epsilon(&mut self) -> TrainOutcome {
        let floor = self.config.epsilon_min;
        if self.epsilon > floor {
            self.epsilon = (self.epsilon * self.config.epsilon_decay).max(floor);
            if self.epsilon <= floor {
                debug!("exploration rate reached its floor {} after {} training steps", floor, self.train_steps);
            }
        }

        if self.epsilon <= floor {
            TrainOutcome::FloorReached
        } else {
            TrainOutcome::Decayed { epsilon: self.epsilon }
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Override the exploration rate, clamped to `[0, 1]`.
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    pub fn observation_size(&self) -> usize {
        self.observation_size
    }

    pub fn action_count(&self) -> usize {
        self.action_count
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn memory(&self) -> &ReplayMemory<R> {
        &self.memory
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Number of training calls that replayed a batch.
    pub fn train_steps(&self) -> usize {
        self.train_steps
    }
}

/// Predict and check the model returned one non-NaN value per action.
fn checked_predict<M: ActionValueModel>(model: &mut M, state: ArrayView1<f32>, action_count: usize) -> Result<Array1<f32>> {
    let values = model.predict(state)?;
    if values.len() != action_count {
        return Err(DqnError::dimension_mismatch(
            format!("{} action-values", action_count),
            format!("{}", values.len()),
        ));
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err(DqnError::NumericalError(format!("model predicted NaN action-values {}", values)));
    }
    Ok(values)
}

/// Index of the largest value; the first one wins on ties.
fn argmax(values: &Array1<f32>) -> Result<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
        .ok_or_else(|| DqnError::NumericalError("No valid Q-values".to_string()))
}

fn max_value(values: &Array1<f32>) -> f32 {
    values.iter().fold(f32::NEG_INFINITY, |max, &value| max.max(value))
}
