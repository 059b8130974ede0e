use cartpole_dqn::{
    agent::DqnAgent,
    config::{AgentConfig, ModelConfig, TrainInterval, TrainingConfig},
    environment::{CartPole, Environment, Step},
    error::{DqnError, Result},
    q_network::{QNetwork, QNetworkFactory},
    trainer::Trainer,
};
use ndarray::{array, Array1};

/// Episodes last exactly `length` steps, or forever when `length` is `None`.
struct FixedLengthEnv {
    length: Option<usize>,
    steps: usize,
    fail_on_step: bool,
}

impl FixedLengthEnv {
    fn new(length: Option<usize>) -> Self {
        FixedLengthEnv {
            length,
            steps: 0,
            fail_on_step: false,
        }
    }
}

impl Environment for FixedLengthEnv {
    fn reset(&mut self) -> Result<Array1<f32>> {
        self.steps = 0;
        Ok(array![0.0, 0.0])
    }

    fn step(&mut self, _action: usize) -> Result<Step> {
        if self.fail_on_step {
            return Err(DqnError::Environment("simulation crashed".to_string()));
        }
        self.steps += 1;
        let done = self.length.map_or(false, |length| self.steps >= length);
        Ok(Step {
            observation: array![self.steps as f32 / 100.0, 1.0],
            reward: if done { 0.0 } else { 1.0 },
            done,
        })
    }

    fn observation_space_size(&self) -> usize {
        2
    }

    fn action_space_size(&self) -> usize {
        2
    }
}

fn agent(observation_size: usize, seed: u64) -> DqnAgent<QNetwork> {
    let factory = QNetworkFactory::new(ModelConfig::default().hidden_layers(&[16])).seed(seed);
    DqnAgent::with_seed(observation_size, 2, AgentConfig::default(), factory, seed).unwrap()
}

#[test]
fn test_end_to_end_cartpole_training() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut env = CartPole::with_seed(0);
    let mut agent = agent(4, 0);
    let trainer = Trainer::new(TrainingConfig::default().episodes(5).batch_size(8)).unwrap();

    let summary = trainer.train(&mut env, &mut agent).unwrap();

    assert_eq!(summary.episodes, 5);
    assert_eq!(summary.scores.len(), 5);
    assert!(summary.scores.iter().all(|&s| (1..=500).contains(&s)));
    assert_eq!(summary.best_score, *summary.scores.iter().max().unwrap());
    assert_eq!(summary.total_steps, summary.scores.iter().sum::<usize>());
    assert!(summary.solved_at.is_none());
    assert!(summary.final_epsilon < 1.0);
    assert_eq!(summary.final_epsilon, agent.epsilon());
    assert!(agent.train_steps() > 0);
    assert!(agent.model().last_loss().map_or(false, f32::is_finite));
}

#[test]
fn test_training_stops_when_solved() {
    let mut env = FixedLengthEnv::new(Some(20));
    let mut agent = agent(2, 1);
    let config = TrainingConfig::default()
        .episodes(50)
        .batch_size(4)
        .solved_threshold(10.0);

    let summary = Trainer::new(config).unwrap().train(&mut env, &mut agent).unwrap();

    assert_eq!(summary.solved_at, Some(0));
    assert_eq!(summary.episodes, 1);
    assert_eq!(summary.mean_score, 20.0);
    // No training after the solving episode
    assert_eq!(agent.train_steps(), 0);
    assert_eq!(agent.memory().size(), 20);
}

#[test]
fn test_episodes_are_truncated() {
    let mut env = FixedLengthEnv::new(None);
    let mut agent = agent(2, 2);
    let config = TrainingConfig::default()
        .episodes(3)
        .batch_size(4)
        .max_steps_per_episode(Some(50));

    let summary = Trainer::new(config).unwrap().train(&mut env, &mut agent).unwrap();

    assert_eq!(summary.scores, vec![50, 50, 50]);
    assert_eq!(agent.train_steps(), 3);
}

#[test]
fn test_per_step_training() {
    let mut env = FixedLengthEnv::new(Some(10));
    let mut agent = agent(2, 3);
    let config = TrainingConfig::default()
        .episodes(2)
        .batch_size(4)
        .train_interval(TrainInterval::Step);

    Trainer::new(config).unwrap().train(&mut env, &mut agent).unwrap();

    // Steps 4..=20 each replay a batch
    assert_eq!(agent.train_steps(), 17);
}

#[test]
fn test_evaluate_is_greedy_and_restores_epsilon() {
    let mut env = FixedLengthEnv::new(Some(7));
    let mut agent = agent(2, 4);
    agent.set_epsilon(0.7);
    let trainer = Trainer::new(TrainingConfig::default()).unwrap();

    let scores = trainer.evaluate(&mut env, &mut agent, 3).unwrap();

    assert_eq!(scores, vec![7, 7, 7]);
    assert_eq!(agent.epsilon(), 0.7);
    assert!(agent.memory().is_empty());
}

#[test]
fn test_evaluate_restores_epsilon_on_error() {
    let mut env = FixedLengthEnv::new(Some(7));
    env.fail_on_step = true;
    let mut agent = agent(2, 5);
    agent.set_epsilon(0.3);
    let trainer = Trainer::new(TrainingConfig::default()).unwrap();

    let result = trainer.evaluate(&mut env, &mut agent, 1);

    assert!(matches!(result, Err(DqnError::Environment(_))));
    assert_eq!(agent.epsilon(), 0.3);
}

#[test]
fn test_dimension_mismatch_is_rejected() {
    let mut env = CartPole::with_seed(0);
    let mut agent = agent(3, 6);
    let trainer = Trainer::new(TrainingConfig::default().episodes(1)).unwrap();

    assert!(matches!(
        trainer.train(&mut env, &mut agent),
        Err(DqnError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_invalid_training_config() {
    assert!(Trainer::new(TrainingConfig::default().batch_size(0)).is_err());
    assert!(Trainer::new(TrainingConfig::default().score_window(0)).is_err());
}
