use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::agent::{DqnAgent, TrainOutcome};
use crate::config::AgentConfig;
use crate::error::{DqnError, Result};
use super::{stub_factory, StubModel};

fn seeded_agent(values: Array1<f32>, action_count: usize, config: AgentConfig) -> DqnAgent<StubModel> {
    DqnAgent::with_seed(4, action_count, config, stub_factory(values), 42).unwrap()
}

fn state(i: usize) -> Array1<f32> {
    array![i as f32, 0.0, 0.0, 0.0]
}

#[test]
fn test_agent_creation() {
    let agent = seeded_agent(array![0.0, 0.0], 2, AgentConfig::default());

    assert_eq!(agent.observation_size(), 4);
    assert_eq!(agent.action_count(), 2);
    assert_eq!(agent.epsilon(), 1.0);
    assert_eq!(agent.memory().capacity(), 2000);
    assert!(agent.memory().is_empty());
    assert_eq!(agent.train_steps(), 0);
}

#[test]
fn test_zero_dimensions_are_rejected_before_building_the_model() {
    let mut built = false;
    let factory = |_: usize, _: usize| -> Result<StubModel> {
        built = true;
        Ok(StubModel::new(array![0.0]))
    };
    let result = DqnAgent::with_seed(0, 2, AgentConfig::default(), factory, 0);
    assert!(matches!(result, Err(DqnError::InvalidParameter { .. })));
    assert!(!built);

    let result = DqnAgent::with_seed(4, 0, AgentConfig::default(), stub_factory(array![0.0]), 0);
    assert!(matches!(result, Err(DqnError::InvalidParameter { .. })));
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = DqnAgent::with_seed(4, 2, AgentConfig::default().memory_capacity(0), stub_factory(array![0.0, 0.0]), 0);
    assert!(result.is_err());
}

#[test]
fn test_greedy_selection_ties_go_to_lowest_index() {
    let mut agent = seeded_agent(array![0.5, 0.5], 2, AgentConfig::default());
    agent.set_epsilon(0.0);

    for _ in 0..50 {
        assert_eq!(agent.select_action(state(0).view()).unwrap(), 0);
    }
}

#[test]
fn test_greedy_selection_picks_highest_value() {
    let mut agent = seeded_agent(array![0.1, 0.9], 2, AgentConfig::default());
    agent.set_epsilon(0.0);

    for _ in 0..50 {
        assert_eq!(agent.select_action(state(0).view()).unwrap(), 1);
    }
    assert_eq!(agent.model().predict_calls, 50);
}

#[test]
fn test_full_exploration_is_uniform_and_skips_the_model() {
    let mut agent = seeded_agent(array![0.0, 0.0, 0.0, 1.0], 4, AgentConfig::default());
    assert_eq!(agent.epsilon(), 1.0);

    let mut counts = [0usize; 4];
    for _ in 0..10_000 {
        counts[agent.select_action(state(0).view()).unwrap()] += 1;
    }

    assert_eq!(agent.model().predict_calls, 0);
    for count in counts {
        assert!((2250..=2750).contains(&count), "counts {:?}", counts);
    }
}

#[test]
fn test_seeded_agents_explore_identically() {
    let mut a = seeded_agent(array![0.0, 0.0], 2, AgentConfig::default());
    let mut b = seeded_agent(array![0.0, 0.0], 2, AgentConfig::default());
    a.set_epsilon(0.5);
    b.set_epsilon(0.5);

    for _ in 0..100 {
        assert_eq!(
            a.select_action(state(0).view()).unwrap(),
            b.select_action(state(0).view()).unwrap()
        );
    }
}

#[test]
fn test_wrong_state_length_is_rejected() {
    let mut agent = seeded_agent(array![0.0, 0.0], 2, AgentConfig::default());
    agent.set_epsilon(0.0);

    let result = agent.select_action(array![0.0, 0.0].view());
    assert!(matches!(result, Err(DqnError::DimensionMismatch { .. })));
}

#[test]
fn test_wrong_prediction_length_is_rejected() {
    let mut agent = seeded_agent(array![0.0, 0.0, 0.0], 2, AgentConfig::default());
    agent.set_epsilon(0.0);

    let result = agent.select_action(state(0).view());
    assert!(matches!(result, Err(DqnError::DimensionMismatch { .. })));
}

#[test]
fn test_set_epsilon_clamps() {
    let mut agent = seeded_agent(array![0.0, 0.0], 2, AgentConfig::default());
    agent.set_epsilon(1.5);
    assert_eq!(agent.epsilon(), 1.0);
    agent.set_epsilon(-0.5);
    assert_eq!(agent.epsilon(), 0.0);
}

#[test]
fn test_remember_is_bounded() {
    let mut agent = seeded_agent(array![0.0, 0.0], 2, AgentConfig::default().memory_capacity(3));

    for i in 0..5 {
        agent.remember(state(i), i % 2, 1.0, state(i + 1), false).unwrap();
    }

    assert_eq!(agent.memory().size(), 3);
    let firsts: Vec<f32> = agent.memory().iter().map(|t| t.state[0]).collect();
    assert_eq!(firsts, vec![2.0, 3.0, 4.0]);
}

#[test]
fn test_train_skips_when_memory_is_short() {
    let mut agent = seeded_agent(array![1.0, 2.0], 2, AgentConfig::default());
    agent.remember(state(0), 0, 1.0, state(1), false).unwrap();
    agent.remember(state(1), 1, 1.0, state(2), false).unwrap();

    assert_eq!(agent.train(3).unwrap(), TrainOutcome::Skipped);
    assert!(agent.model().fits.is_empty());
    assert_eq!(agent.epsilon(), 1.0);
    assert_eq!(agent.train_steps(), 0);
}

#[test]
fn test_train_rejects_zero_batch() {
    let mut agent = seeded_agent(array![1.0, 2.0], 2, AgentConfig::default());
    assert!(matches!(agent.train(0), Err(DqnError::InvalidParameter { .. })));
}

fn filled_agent() -> DqnAgent<StubModel> {
    let mut agent = seeded_agent(array![1.0, 2.0], 2, AgentConfig::default().memory_capacity(5));
    for i in 0..5 {
        agent.remember(state(i), i % 2, 1.0, state(i + 1), i == 2).unwrap();
    }
    agent
}

fn expected_target(action: usize, terminal: bool) -> Array1<f32> {
    let mut target = array![1.0, 2.0];
    target[action] = if terminal { 1.0 } else { 1.0 + 0.95 * 2.0 };
    target
}

#[test]
fn test_train_fits_temporal_difference_targets() {
    let mut agent = filled_agent();

    let outcome = agent.train(3).unwrap();

    assert_eq!(outcome, TrainOutcome::Decayed { epsilon: 0.995 });
    assert_eq!(agent.epsilon(), 0.995);
    assert_eq!(agent.train_steps(), 1);

    let fits = &agent.model().fits;
    assert_eq!(fits.len(), 3);
    for (fitted_state, target) in fits {
        let i = fitted_state[0] as usize;
        let expected = expected_target(i % 2, i == 2);
        assert!((target - &expected).iter().all(|d| d.abs() < 1e-6), "target {} for state {}", target, i);
    }
}

#[test]
fn test_train_full_batch_includes_terminal_transition() {
    let mut agent = filled_agent();

    agent.train(5).unwrap();

    let fits = &agent.model().fits;
    assert_eq!(fits.len(), 5);
    let mut seen: Vec<usize> = fits.iter().map(|(s, _)| s[0] as usize).collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);

    let (_, terminal_target) = fits.iter().find(|(s, _)| s[0] == 2.0).unwrap();
    // state 2 took action 0 and ended the episode
    assert_eq!(terminal_target, &array![1.0, 2.0]);
}

#[test]
fn test_epsilon_decays_to_floor() {
    let mut agent = seeded_agent(array![1.0, 2.0], 2, AgentConfig::default());
    agent.remember(state(0), 0, 1.0, state(1), false).unwrap();

    let mut last = agent.epsilon();
    for _ in 0..10_000 {
        agent.train(1).unwrap();
        assert!(agent.epsilon() <= last);
        last = agent.epsilon();
    }

    assert_eq!(agent.epsilon(), 0.01);
    assert_eq!(agent.train(1).unwrap(), TrainOutcome::FloorReached);
    assert_eq!(agent.epsilon(), 0.01);
}

#[test]
fn test_model_error_leaves_epsilon_untouched() {
    let mut agent = filled_agent();
    agent.model_mut().fail_fit = true;

    let result = agent.train(2);

    assert!(matches!(result, Err(DqnError::NumericalError(_))));
    assert_eq!(agent.epsilon(), 1.0);
    assert_eq!(agent.train_steps(), 0);
}

#[test]
fn test_explicit_rngs() {
    let agent = DqnAgent::with_rngs(
        4,
        2,
        AgentConfig::default(),
        stub_factory(array![0.0, 0.0]),
        StdRng::seed_from_u64(1),
        StdRng::seed_from_u64(2),
    );
    assert!(agent.is_ok());
}

#[test]
fn test_remember_rejects_malformed_transitions() {
    let mut agent = seeded_agent(array![1.0, 2.0], 2, AgentConfig::default().memory_capacity(3));
    agent.remember(state(0), 0, 1.0, state(1), false).unwrap();
    agent.remember(state(1), 1, 1.0, state(2), false).unwrap();

    let short_state = agent.remember(array![0.0, 0.0], 0, 1.0, state(3), false);
    assert!(matches!(short_state, Err(DqnError::DimensionMismatch { .. })));

    let short_next_state = agent.remember(state(2), 0, 1.0, array![0.0], false);
    assert!(matches!(short_next_state, Err(DqnError::DimensionMismatch { .. })));

    match agent.remember(state(2), 7, 1.0, state(3), false) {
        Err(DqnError::InvalidAction { action, max_actions }) => {
            assert_eq!(action, 7);
            assert_eq!(max_actions, 2);
        }
        other => panic!("expected InvalidAction, got {:?}", other),
    }

    assert_eq!(agent.memory().size(), 2);

    // Training still works on the transitions that were kept
    agent.remember(state(2), 0, 1.0, state(3), true).unwrap();
    assert_eq!(agent.train(3).unwrap(), TrainOutcome::Decayed { epsilon: 0.995 });
}
