//! Games driven by [`AtariEnv`](crate::AtariEnv).
#[cfg(feature = "ale")]
mod ale;
use crate::AtariEnvConfig;
use anyhow::Result;
#[cfg(feature = "ale")]
pub use ale::AleBackend;

/// A game emulator producing RGB screens.
pub trait GameBackend {
    /// Loads the game named in the configuration.
    fn build(config: &AtariEnvConfig, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Number of actions accepted by [`GameBackend::act`].
    fn n_actions(&self) -> usize;

    /// Starts a new game.
    fn reset(&mut self);

    /// Applies the action with the given index and returns the reward.
    fn act(&mut self, action: usize) -> f32;

    /// Returns `true` if the game reached a terminal state.
    fn is_game_over(&self) -> bool;

    /// `(width, height)` of the screen.
    fn screen_size(&self) -> (u32, u32);

    /// The current screen as RGB bytes in row-major order.
    fn screen_rgb(&self) -> Vec<u8>;

    /// Auxiliary features of the current state. Empty by default.
    fn aux(&self) -> Vec<f32> {
        vec![]
    }
}
