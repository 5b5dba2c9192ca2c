//! Transitions and batches of transitions.
use crate::{Env, Step, TransitionBatch};

/// A transition `(o_t, a_t, o_t+1, r_t, terminated_t, truncated_t)`.
#[derive(Clone, Debug)]
pub struct Transition<O, A> {
    /// Observation before the action.
    pub obs: O,

    /// Action.
    pub act: A,

    /// Observation after the action.
    pub next_obs: O,

    /// Reward.
    pub reward: f32,

    /// The episode reached a terminal state.
    pub is_terminated: bool,

    /// The episode was cut off.
    pub is_truncated: bool,
}

impl<O, A> Transition<O, A> {
    /// Creates a transition from the observation preceding `step`.
    pub fn from_step<E>(obs: O, step: Step<E>) -> Self
    where
        E: Env<Obs = O, Act = A>,
    {
        Self {
            obs,
            act: step.act,
            next_obs: step.obs,
            reward: step.reward,
            is_terminated: step.is_terminated,
            is_truncated: step.is_truncated,
        }
    }

    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// A batch of transitions, stored field by field.
pub struct StdBatch<O, A> {
    /// Observations.
    pub obs: Vec<O>,

    /// Actions.
    pub act: Vec<A>,

    /// Next observations.
    pub next_obs: Vec<O>,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Termination flags, `1` for terminal transitions.
    pub is_terminated: Vec<i8>,

    /// Truncation flags.
    pub is_truncated: Vec<i8>,
}

impl<O: Clone, A: Clone> StdBatch<O, A> {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        Self {
            obs: Vec::with_capacity(capacity),
            act: Vec::with_capacity(capacity),
            next_obs: Vec::with_capacity(capacity),
            reward: Vec::with_capacity(capacity),
            is_terminated: Vec::with_capacity(capacity),
            is_truncated: Vec::with_capacity(capacity),
        }
    }

    pub(super) fn push(&mut self, tr: &Transition<O, A>) {
        self.obs.push(tr.obs.clone());
        self.act.push(tr.act.clone());
        self.next_obs.push(tr.next_obs.clone());
        self.reward.push(tr.reward);
        self.is_terminated.push(tr.is_terminated as i8);
        self.is_truncated.push(tr.is_truncated as i8);
    }
}

impl<O, A> TransitionBatch for StdBatch<O, A> {
    type ObsBatch = Vec<O>;
    type ActBatch = Vec<A>;

    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Vec<i8>,
        Vec<i8>,
    ) {
        (
            self.obs,
            self.act,
            self.next_obs,
            self.reward,
            self.is_terminated,
            self.is_truncated,
        )
    }

    fn len(&self) -> usize {
        self.reward.len()
    }

    fn obs(&self) -> &Self::ObsBatch {
        &self.obs
    }

    fn act(&self) -> &Self::ActBatch {
        &self.act
    }
}
