//! Exploration strategy of DQN.
use serde::{Deserialize, Serialize};
use tch::Tensor;

/// Epsilon-greedy explorer with exponentially decaying epsilon.
///
/// `eps(step) = eps_end + (eps_start - eps_end) * exp(-step / eps_decay)`
///
/// The step counter increases on every action selection, random or greedy.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    pub n_steps: usize,
    pub eps_start: f64,
    pub eps_end: f64,
    pub eps_decay: f64,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            n_steps: 0,
            eps_start: 0.98,
            eps_end: 0.05,
            eps_decay: 100_000.0,
        }
    }
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Epsilon at the given step.
    pub fn eps_at(&self, step: usize) -> f64 {
        self.eps_end + (self.eps_start - self.eps_end) * (-(step as f64) / self.eps_decay).exp()
    }

    /// Epsilon at the current step.
    pub fn eps(&self) -> f64 {
        self.eps_at(self.n_steps)
    }

    /// Selects an action among `n_actions`.
    ///
    /// `q` is evaluated only when the greedy branch is taken and must return
    /// action values of shape `[1, n_actions]`.
    pub fn action<F>(&mut self, q: F, n_actions: i64) -> i64
    where
        F: FnOnce() -> Tensor,
    {
        let eps = self.eps();
        self.n_steps += 1;

        if fastrand::f64() > eps {
            q().argmax(-1, false).int64_value(&[0])
        } else {
            fastrand::i64(0..n_actions)
        }
    }

    /// Set the epsilon value at the start.
    pub fn eps_start(mut self, v: f64) -> Self {
        self.eps_start = v;
        self
    }

    /// Set the epsilon value approached as steps go to infinity.
    pub fn eps_end(mut self, v: f64) -> Self {
        self.eps_end = v;
        self
    }

    /// Set the decay constant in steps.
    pub fn eps_decay(mut self, v: f64) -> Self {
        self.eps_decay = v;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tch::{Device, Kind};

    #[test]
    fn test_eps_starts_at_eps_start() {
        let explorer = EpsilonGreedy::new();
        assert!((explorer.eps_at(0) - 0.98).abs() < 1e-12);
    }

    #[test]
    fn test_eps_decreases_towards_eps_end() {
        let explorer = EpsilonGreedy::new();
        let mut prev = explorer.eps_at(0);
        for step in (1..1_000_000).step_by(10_000) {
            let eps = explorer.eps_at(step);
            assert!(eps < prev);
            assert!(eps > 0.05);
            prev = eps;
        }
        assert!((explorer.eps_at(10_000_000) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_unit_decay() {
        let explorer = EpsilonGreedy::new().eps_start(1.0).eps_end(0.0).eps_decay(1.0);
        assert!((explorer.eps_at(0) - 1.0).abs() < 1e-12);
        assert!(explorer.eps_at(50) < 1e-20);
    }

    #[test]
    fn test_counter_increments_on_both_branches() {
        let q = || Tensor::from_slice(&[0.0f32, 2.0, 1.0]).view([1, 3]);

        // Always random
        let mut explorer = EpsilonGreedy::new().eps_start(1.0).eps_end(1.0);
        for _ in 0..10 {
            let a = explorer.action(q, 3);
            assert!((0..3).contains(&a));
        }
        assert_eq!(explorer.n_steps, 10);

        // Always greedy
        let mut explorer = EpsilonGreedy::new().eps_start(0.0).eps_end(0.0);
        for _ in 0..10 {
            assert_eq!(explorer.action(q, 3), 1);
        }
        assert_eq!(explorer.n_steps, 10);
    }

    #[test]
    fn test_random_branch_skips_q_evaluation() {
        let mut explorer = EpsilonGreedy::new().eps_start(1.0).eps_end(1.0);
        let mut called = false;
        explorer.action(
            || {
                called = true;
                Tensor::zeros([1, 2], (Kind::Float, Device::Cpu))
            },
            2,
        );
        assert!(!called);
    }
}
