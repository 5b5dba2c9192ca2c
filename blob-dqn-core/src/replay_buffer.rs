//! A FIFO replay buffer with uniform sampling.
mod base;
mod batch;
mod config;
pub use base::ReplayBuffer;
pub use batch::{StdBatch, Transition};
pub use config::ReplayBufferConfig;
