//! Episode loop driving an agent through an environment.
use log::{debug, info};
use rand::Rng;

use crate::agent::{ActionValueModel, DqnAgent, TrainOutcome};
use crate::config::{TrainInterval, TrainingConfig};
use crate::environment::Environment;
use crate::error::{DqnError, Result};
use crate::metrics::ScoreTracker;

/// Result of [`Trainer::train`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    /// Number of episodes played.
    pub episodes: usize,

    /// Index of the episode after which the windowed mean reached the threshold.
    pub solved_at: Option<usize>,

    /// Windowed mean score when training stopped.
    pub mean_score: f32,

    pub best_score: usize,

    /// Frames played over all episodes.
    pub total_steps: usize,

    pub final_epsilon: f32,

    /// Frames survived in every episode, in order.
    pub scores: Vec<usize>,
}

/// Runs training and evaluation episodes.
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Trainer { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train until the configured number of episodes has been played or the
    /// windowed mean score reaches the solved threshold.
    ///
    /// With [`TrainInterval::Episode`] the agent replays one batch after every
    /// episode that did not solve the task.
    pub fn train<E, M, R>(&self, env: &mut E, agent: &mut DqnAgent<M, R>) -> Result<TrainingSummary>
    where
        E: Environment,
        M: ActionValueModel,
        R: Rng,
    {
        check_dimensions(env, agent)?;

        let mut tracker = ScoreTracker::new(self.config.score_window)?;
        let mut scores = Vec::new();
        let mut solved_at = None;

        for episode in 0..self.config.episodes {
            let frames = self.run_episode(env, agent, true)?;
            tracker.record_episode(frames);
            scores.push(frames);

            let mean = tracker.mean_score();
            info!(
                "Episode {:>3}/{}: {:>3} frames, mean {:.1}, epsilon {:.3}",
                episode + 1,
                self.config.episodes,
                frames,
                mean,
                agent.epsilon()
            );

            if mean >= self.config.solved_threshold {
                if tracker.is_window_full() {
                    info!(
                        "Solved after {} episodes with mean score {:.1} over the last {}",
                        episode + 1,
                        mean,
                        self.config.score_window
                    );
                } else {
                    info!("Solved after {} episodes with mean score {:.1} over all episodes", episode + 1, mean);
                }
                solved_at = Some(episode);
                break;
            }

            if self.config.train_interval == TrainInterval::Episode {
                let outcome = agent.train(self.config.batch_size)?;
                log_outcome(outcome);
            }
        }

        Ok(TrainingSummary {
            episodes: tracker.episode_count(),
            solved_at,
            mean_score: tracker.mean_score(),
            best_score: tracker.best_score(),
            total_steps: tracker.total_steps(),
            final_epsilon: agent.epsilon(),
            scores,
        })
    }

    /// Play `episodes` greedy episodes without storing or training.
    ///
    /// The agent's exploration rate is forced to zero for the duration and
    /// restored afterwards, also when an episode fails.
    pub fn evaluate<E, M, R>(&self, env: &mut E, agent: &mut DqnAgent<M, R>, episodes: usize) -> Result<Vec<usize>>
    where
        E: Environment,
        M: ActionValueModel,
        R: Rng,
    {
        check_dimensions(env, agent)?;

        let saved_epsilon = agent.epsilon();
        agent.set_epsilon(0.0);
        let scores = (0..episodes)
            .map(|_| self.run_episode(env, agent, false))
            .collect::<Result<Vec<_>>>();
        agent.set_epsilon(saved_epsilon);

        let scores = scores?;
        for (game, score) in scores.iter().enumerate() {
            info!("Evaluation game {}: {} frames", game + 1, score);
        }
        Ok(scores)
    }

    /// Play one episode and return the number of frames survived.
    fn run_episode<E, M, R>(&self, env: &mut E, agent: &mut DqnAgent<M, R>, learn: bool) -> Result<usize>
    where
        E: Environment,
        M: ActionValueModel,
        R: Rng,
    {
        let mut state = env.reset()?;
        let mut frames = 0;

        loop {
            frames += 1;
            let action = agent.select_action(state.view())?;
            let step = env.step(action)?;
            let next_state = step.observation;

            if learn {
                agent.remember(state, action, step.reward, next_state.clone(), step.done)?;
                if self.config.train_interval == TrainInterval::Step {
                    agent.train(self.config.batch_size)?;
                }
            }
            state = next_state;

            let truncated = self.config.max_steps_per_episode.map_or(false, |max| frames >= max);
            if step.done || truncated {
                return Ok(frames);
            }
        }
    }
}

fn check_dimensions<E, M, R>(env: &E, agent: &DqnAgent<M, R>) -> Result<()>
where
    E: Environment,
    M: ActionValueModel,
    R: Rng,
{
    if env.observation_space_size() != agent.observation_size() {
        return Err(DqnError::dimension_mismatch(
            format!("{} observations", agent.observation_size()),
            format!("{}", env.observation_space_size()),
        ));
    }
    if env.action_space_size() != agent.action_count() {
        return Err(DqnError::dimension_mismatch(
            format!("{} actions", agent.action_count()),
            format!("{}", env.action_space_size()),
        ));
    }
    Ok(())
}

fn log_outcome(outcome: TrainOutcome) {
    match outcome {
        TrainOutcome::Skipped => debug!("not enough transitions stored, training skipped"),
        TrainOutcome::Decayed { epsilon } => debug!("replayed batch, epsilon now {:.4}", epsilon),
        TrainOutcome::FloorReached => debug!("replayed batch, epsilon at floor"),
    }
}
