//! Trains a DQN agent on an Atari game, Pong by default.
//!
//! ```bash
//! export ATARI_ROM_DIR=$HOME/atari_rom
//! cargo run --release -p blob-dqn -- pong --create-config --config pong.yaml
//! cargo run --release -p blob-dqn -- pong --config pong.yaml
//! ```
mod config;
use anyhow::Result;
use blob_dqn_atari_env::{AleBackend, AtariAct, AtariEnv, AtariObs};
use blob_dqn_core::{replay_buffer::ReplayBuffer, Env as _, Trainer};
use blob_dqn_tch_agent::{
    dqn::Dqn as Dqn_,
    qnet::{QNet, StackObs},
};
use blob_dqn_tensorboard::TensorboardRecorder;
use chrono::Local;
use clap::Parser;
use config::BlobDqnConfig;
use log::info;
use std::path::Path;

type Env = AtariEnv<AleBackend>;
type Buffer = ReplayBuffer<AtariObs, AtariAct>;
type Dqn = Dqn_<Env, QNet, Buffer>;

/// Train DQN agent in atari environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Name of the game
    #[arg(default_value = "pong")]
    name: String,

    /// YAML file overriding the default configuration
    #[arg(long)]
    config: Option<String>,

    /// Write the default configuration to the file given by --config and exit
    #[arg(long, default_value_t = false)]
    create_config: bool,

    /// Show the configuration and exit
    #[arg(long, default_value_t = false)]
    show_config: bool,

    /// Seed of the environment, the network initialization and exploration
    #[arg(long, default_value_t = 0)]
    seed: i64,
}

/// Seeds libtorch and the random number generator used for exploration.
fn seed_everything(seed: i64) {
    tch::manual_seed(seed);
    fastrand::seed(seed as u64);
}

/// Fixes the input shapes and the number of actions of the agent
/// from a first observation of the game.
fn bind_agent_config(config: &mut BlobDqnConfig, seed: i64) -> Result<()> {
    let mut env = Env::build(&config.env, seed)?;
    let obs = env.reset()?;
    let n_actions = env.n_actions();
    info!("{} actions, observation shape {:?}", n_actions, obs.shape);

    if let Some(q_config) = config.agent.q_config_mut() {
        q_config.bind_shapes(&AtariObs::stack(&[obs]))?;
    }
    config.agent = config
        .agent
        .clone()
        .out_dim(n_actions as _)
        .device(tch::Device::cuda_if_available());
    Ok(())
}

fn create_config(args: &Args) -> Result<()> {
    let path = args.config.as_deref().unwrap_or("blob_dqn.yaml");
    BlobDqnConfig::new(&args.name).save(path)?;
    println!("Create config file: {}", path);
    Ok(())
}

fn train(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => BlobDqnConfig::load(path)?,
        None => BlobDqnConfig::new(&args.name),
    };
    bind_agent_config(&mut config, args.seed)?;

    if args.show_config {
        println!("Device: {:?}", tch::Device::cuda_if_available());
        println!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let logdir = Path::new(&config.trainer.model_dir)
        .join("tensorboard")
        .join(format!("dqn {}", Local::now().format("%m%d%Y_%H%M%S")));
    let mut recorder = TensorboardRecorder::new(logdir);
    let mut agent = Dqn::build(config.agent.clone())?;
    let mut trainer = Trainer::<Env, Buffer>::build(
        config.trainer.clone(),
        config.env.clone(),
        config.replay_buffer.clone(),
    )
    .env_seed(args.seed)
    .hparams(config.hparams());

    let summary = trainer.train(&mut agent, &mut recorder)?;
    info!(
        "{} episodes, {} env steps, {} opt steps, last reward {}, checkpoints in {:?}",
        summary.episodes,
        summary.env_steps,
        summary.opt_steps,
        summary.last_episode_reward,
        summary.run_dir
    );

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    seed_everything(args.seed);

    if args.create_config {
        create_config(&args)?;
    } else {
        train(&args)?;
    }

    Ok(())
}
