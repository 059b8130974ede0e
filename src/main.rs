//! Train a DQN agent on the built-in cart-pole simulation.
use clap::Parser;
use log::info;
use std::path::PathBuf;

use cartpole_dqn::agent::DqnAgent;
use cartpole_dqn::config::Config;
use cartpole_dqn::environment::{CartPole, Environment};
use cartpole_dqn::error::Result;
use cartpole_dqn::q_network::QNetworkFactory;
use cartpole_dqn::trainer::Trainer;

#[derive(Debug, Parser)]
#[command(name = "cartpole-dqn", about = "Train a DQN agent to balance a pole on a cart")]
struct Args {
    /// JSON config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Transitions replayed per training step
    #[arg(long)]
    batch_size: Option<usize>,

    /// Seed for weights, exploration, replay sampling and the simulation
    #[arg(long)]
    seed: Option<u64>,

    /// Greedy evaluation episodes to play after training
    #[arg(long, default_value_t = 0)]
    eval_episodes: usize,

    /// Write the effective config to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(episodes) = args.episodes {
        config.training.episodes = episodes;
    }
    if let Some(batch_size) = args.batch_size {
        config.training.batch_size = batch_size;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    if let Some(path) = &args.write_config {
        config.save(path)?;
        info!("Wrote config to {}", path.display());
        return Ok(());
    }

    let (mut env, factory) = match config.seed {
        Some(seed) => (
            CartPole::with_seed(seed),
            QNetworkFactory::new(config.model.clone()).seed(seed.wrapping_add(1)),
        ),
        None => (CartPole::new(), QNetworkFactory::new(config.model.clone())),
    };

    let observation_size = env.observation_space_size();
    let action_count = env.action_space_size();
    let mut agent = match config.seed {
        Some(seed) => DqnAgent::with_seed(observation_size, action_count, config.agent.clone(), factory, seed.wrapping_add(2))?,
        None => DqnAgent::new(observation_size, action_count, config.agent.clone(), factory)?,
    };

    let trainer = Trainer::new(config.training.clone())?;
    let summary = trainer.train(&mut env, &mut agent)?;
    match summary.solved_at {
        Some(episode) => info!("Goal reached at episode {} with mean {:.1}", episode + 1, summary.mean_score),
        None => info!(
            "Goal not reached after {} episodes ({} frames); mean {:.1}, best {}",
            summary.episodes, summary.total_steps, summary.mean_score, summary.best_score
        ),
    }

    if args.eval_episodes > 0 {
        let scores = trainer.evaluate(&mut env, &mut agent, args.eval_episodes)?;
        let mean = scores.iter().sum::<usize>() as f32 / scores.len() as f32;
        info!("Mean evaluation score: {:.1}", mean);
    }

    Ok(())
}
