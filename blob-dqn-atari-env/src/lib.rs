//! Atari-style pixel environment for blob-dqn.
//!
//! Screens are converted to grayscale, downscaled by a constant factor
//! (210x160 becomes 21x16 with the default factor 10) and stacked over the
//! last frames along the channel axis. An action is repeated for
//! `frame_skip` frames with rewards summed, and an episode is truncated
//! after `max_steps` steps.
//!
//! The game itself is a [`GameBackend`]. [`AleBackend`] runs ROMs with the
//! Arcade Learning Environment and is available with the `ale` feature.
//! ROM images are loaded from the directory given by environment variable
//! `ATARI_ROM_DIR`, e.g. installed with [AutoROM](https://pypi.org/project/AutoROM/).
//!
//! ```bash
//! pip install autorom
//! mkdir $HOME/atari_rom
//! AutoROM --install-dir $HOME/atari_rom
//! export ATARI_ROM_DIR=$HOME/atari_rom
//! ```
//!
//! With the `tch` feature, [`AtariObs`] can be stacked into the input of
//! the Q-network of `blob-dqn-tch-agent`.
mod act;
mod backend;
mod env;
mod obs;
pub mod frame;
pub use act::AtariAct;
#[cfg(feature = "ale")]
pub use backend::AleBackend;
pub use backend::GameBackend;
pub use env::{AtariEnv, AtariEnvConfig};
pub use obs::AtariObs;
