//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct TrainerConfig {
    /// The number of episodes to run.
    pub n_episodes: usize,

    /// Minimum number of transitions in the replay buffer before
    /// optimization and per-episode checkpointing start.
    pub min_replay_size: usize,

    /// Directory under which run directories are created.
    pub model_dir: String,

    /// Checkpoint loaded at startup if the file exists.
    pub resume_path: Option<String>,

    /// Record the running reward at every environment step.
    pub record_step_reward: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_episodes: 50_000,
            min_replay_size: 10_000,
            model_dir: "checkpointsDQN".to_string(),
            resume_path: Some("checkpointsDQN/non_existent".to_string()),
            record_step_reward: true,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the minimum fill of the replay buffer.
    pub fn min_replay_size(mut self, v: usize) -> Self {
        self.min_replay_size = v;
        self
    }

    /// Sets the directory of run directories.
    pub fn model_dir(mut self, v: impl Into<String>) -> Self {
        self.model_dir = v.into();
        self
    }

    /// Sets the checkpoint to resume from.
    pub fn resume_path(mut self, v: Option<String>) -> Self {
        self.resume_path = v;
        self
    }

    /// Enables or disables per-step reward records.
    pub fn record_step_reward(mut self, v: bool) -> Self {
        self.record_step_reward = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .n_episodes(100)
            .min_replay_size(64)
            .model_dir("some/directory")
            .resume_path(None);

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer.yaml");
        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
