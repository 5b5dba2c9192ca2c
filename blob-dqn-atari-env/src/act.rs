//! Action for [`AtariEnv`](crate::AtariEnv).
use blob_dqn_core::Act;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Index into the action set of the game.
pub struct AtariAct {
    pub act: i64,
}

impl AtariAct {
    pub fn new(act: i64) -> Self {
        Self { act }
    }
}

impl Act for AtariAct {}

impl From<i64> for AtariAct {
    fn from(act: i64) -> Self {
        Self { act }
    }
}

impl From<AtariAct> for i64 {
    fn from(act: AtariAct) -> Self {
        act.act
    }
}
