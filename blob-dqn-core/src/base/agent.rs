//! Agent.
use super::{Env, Policy, ReplayBufferBase};
use crate::{checkpoint::Epoch, record::Record};
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
pub trait Agent<E: Env, R: ReplayBufferBase>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an optimization step and returns some information.
    ///
    /// Returns `Ok(None)` when the step is skipped, for example because the
    /// buffer has not reached the warmup size yet.
    fn opt_with_record(&mut self, buffer: &mut R) -> Result<Option<Record>>;

    /// Saves a checkpoint of the agent into the file at `path`.
    ///
    /// The checkpoint holds everything needed to resume training: the
    /// parameters of the networks, the optimizer state and the given epoch.
    fn save_params(&self, path: &Path, epoch: Epoch) -> Result<()>;

    /// Loads a checkpoint saved with [`Agent::save_params`] and returns its epoch.
    fn load_params(&mut self, path: &Path) -> Result<Epoch>;
}
