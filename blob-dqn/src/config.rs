//! Configuration bundle of a training run.
use anyhow::Result;
use blob_dqn_atari_env::AtariEnvConfig;
use blob_dqn_core::{
    record::{Record, RecordValue::Scalar},
    replay_buffer::ReplayBufferConfig,
    TrainerConfig,
};
use blob_dqn_tch_agent::{
    dqn::{DqnConfig, DqnModelConfig, EpsilonGreedy},
    opt::OptimizerConfig,
    qnet::{QNet, QNetConfig},
};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configurations of the trainer, the replay buffer, the agent and the environment.
#[derive(Serialize, Deserialize)]
pub struct BlobDqnConfig {
    pub trainer: TrainerConfig,
    pub replay_buffer: ReplayBufferConfig,
    pub agent: DqnConfig<QNet>,
    pub env: AtariEnvConfig,
}

impl BlobDqnConfig {
    /// Default configuration for the given game.
    pub fn new(name: &str) -> Self {
        let model_config = DqnModelConfig::default()
            .q_config(QNetConfig::default())
            .opt_config(OptimizerConfig::default());
        let agent = DqnConfig::default()
            .model_config(model_config)
            .min_transitions_warmup(10_000)
            .batch_size(32)
            .discount_factor(0.99)
            .tau(0.005)
            .explorer(EpsilonGreedy::new())
            .train(true);

        Self {
            trainer: TrainerConfig::default(),
            replay_buffer: ReplayBufferConfig::default(),
            agent,
            env: AtariEnvConfig::default().name(name),
        }
    }

    /// Hyperparameters recorded at the start of a run.
    pub fn hparams(&self) -> Record {
        let opt_config = self.agent.get_opt_config();
        Record::from_slice(&[
            ("lr", Scalar(opt_config.lr() as f32)),
            ("gamma", Scalar(self.agent.get_discount_factor() as f32)),
            ("tau", Scalar(self.agent.get_tau() as f32)),
            ("batch_size", Scalar(self.agent.get_batch_size() as f32)),
            ("weight_decay", Scalar(opt_config.weight_decay() as f32)),
            ("replay_size", Scalar(self.replay_buffer.get_capacity() as f32)),
            ("frame_skip", Scalar(self.env.get_frame_skip() as f32)),
        ])
    }

    /// Loads [`BlobDqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config from {:?}", path_);
        Ok(b)
    }

    /// Saves [`BlobDqnConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config into {:?}", path_);
        Ok(())
    }
}
