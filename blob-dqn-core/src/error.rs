//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum BlobDqnError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// A batch was requested from a replay buffer holding fewer transitions.
    #[error("Replay buffer holds {len} transitions, fewer than the batch size {batch_size}")]
    InsufficientTransitions {
        /// Number of transitions in the buffer.
        len: usize,
        /// Requested batch size.
        batch_size: usize,
    },

    /// Input shapes of a model could not be bound.
    #[error("Shape error: {0}")]
    ShapeError(String),

    /// A checkpoint does not match the model it is loaded into.
    #[error("Checkpoint error: {0}")]
    CheckpointError(String),

    /// Loss diverged.
    #[error("Non-finite loss {loss} at optimization step {opt_steps}")]
    NonFiniteLoss {
        /// The loss value.
        loss: f32,
        /// Optimization steps done so far.
        opt_steps: usize,
    },
}
