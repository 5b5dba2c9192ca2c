//! Checkpoint naming.
//!
//! A training run writes its checkpoints into a run directory named after the
//! local time at which the run started, one file per episode:
//!
//! ```text
//! <model_dir>/<%m%d%Y_%H%M%S>/network_<epoch>.ckpt
//! ```
//!
//! where `<epoch>` is the episode index or `final` for the checkpoint written
//! at the end of the run.
use chrono::{DateTime, Local};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Epoch stored in a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Epoch {
    /// Checkpoint saved after the given episode.
    Index(usize),

    /// Checkpoint saved at the end of the run.
    Final,
}

impl Epoch {
    /// Encodes the epoch as an integer, `-1` for [`Epoch::Final`].
    pub fn to_i64(self) -> i64 {
        match self {
            Self::Index(ix) => ix as i64,
            Self::Final => -1,
        }
    }

    /// Decodes an epoch encoded with [`Epoch::to_i64`].
    pub fn from_i64(v: i64) -> Self {
        if v < 0 {
            Self::Final
        } else {
            Self::Index(v as usize)
        }
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(ix) => write!(f, "{}", ix),
            Self::Final => write!(f, "final"),
        }
    }
}

/// Returns the run directory under `model_dir` for a run started at `start`.
pub fn run_dir(model_dir: impl AsRef<Path>, start: &DateTime<Local>) -> PathBuf {
    model_dir
        .as_ref()
        .join(start.format("%m%d%Y_%H%M%S").to_string())
}

/// Returns the path of the checkpoint file for `epoch` in `run_dir`.
pub fn checkpoint_path(run_dir: impl AsRef<Path>, epoch: Epoch) -> PathBuf {
    run_dir.as_ref().join(format!("network_{}.ckpt", epoch))
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_epoch_encoding() {
        for epoch in [Epoch::Index(0), Epoch::Index(49_999), Epoch::Final] {
            assert_eq!(Epoch::from_i64(epoch.to_i64()), epoch);
        }
        assert_eq!(Epoch::Final.to_i64(), -1);
    }

    #[test]
    fn test_paths() {
        let start = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let dir = run_dir("checkpointsDQN", &start);
        assert_eq!(dir, PathBuf::from("checkpointsDQN/01022024_030405"));
        assert_eq!(
            checkpoint_path(&dir, Epoch::Index(7)),
            PathBuf::from("checkpointsDQN/01022024_030405/network_7.ckpt")
        );
        assert_eq!(
            checkpoint_path(&dir, Epoch::Final),
            PathBuf::from("checkpointsDQN/01022024_030405/network_final.ckpt")
        );
    }
}
