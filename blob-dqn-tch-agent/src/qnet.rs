//! Action-value network taking stacked frames and an auxiliary vector.
//!
//! Two feature pipelines run in parallel. Convolutions extract features from
//! the stacked frames, an MLP extracts features from the auxiliary vector.
//! Both are concatenated and mapped to one value per action by the head.
//!
//! Layer shapes are fixed in two phases. [`QNetConfig::bind_shapes`] observes
//! a sample input, then [`QNet`] is built with fixed-shape layers.
mod base;
mod config;
pub use base::QNet;
pub use config::QNetConfig;
use tch::Tensor;

/// Batched input of [`QNet`].
pub struct PixelInput {
    /// Stacked frames `[B, C, H, W]` of type `u8`.
    pub pixels: Tensor,

    /// Auxiliary vectors `[B, A]`. `A` may be zero.
    pub aux: Tensor,
}

/// Observations that can be stacked into a batched network input.
pub trait StackObs: Sized {
    /// Batched input.
    type Input;

    /// Stacks observations along a new batch dimension.
    fn stack(obs: &[Self]) -> Self::Input;
}
