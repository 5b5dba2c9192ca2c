#![warn(missing_docs)]
//! Core of blob-dqn: environment and agent interfaces, replay buffer,
//! metric records and the episode-driven training loop.
//!
//! Backend-specific pieces, the neural networks and the optimizer, live in
//! `blob-dqn-tch-agent`. Environments live in `blob-dqn-atari-env`.
pub mod checkpoint;
pub mod error;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{
    Act, Agent, Env, ExperienceBufferBase, Info, Obs, Policy, ReplayBufferBase, Step,
    TransitionBatch,
};

mod trainer;
pub use trainer::{TrainSummary, Trainer, TrainerConfig};
