mod base;
mod config;
pub use base::DqnModel;
pub use config::DqnModelConfig;
