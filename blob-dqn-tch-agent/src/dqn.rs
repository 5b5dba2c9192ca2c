//! DQN agent.
mod base;
mod config;
pub mod explorer;
mod model;
pub use base::{td_target, Dqn};
pub use config::DqnConfig;
pub use explorer::EpsilonGreedy;
pub use model::{DqnModel, DqnModelConfig};
