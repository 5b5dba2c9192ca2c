//! Optimizers.
//!
//! The optimizers of `tch` keep their moment estimates inside libtorch and
//! cannot export them, so a checkpoint would lose them. [`Optimizer`] keeps
//! the state as plain tensors that can be written to and read from a
//! checkpoint together with the network parameters.
use crate::util::NamedTensors;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tch::{nn::VarStore, Tensor};

/// Configures an optimizer for training neural networks in an RL agent.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam optimizer.
    Adam {
        /// Learning rate.
        lr: f64,
    },

    /// Adam with decoupled weight decay.
    AdamW {
        /// Learning rate.
        lr: f64,
        /// Decay rate of the first moment.
        beta1: f64,
        /// Decay rate of the second moment.
        beta2: f64,
        /// Weight decay.
        wd: f64,
        /// Term added to the denominator.
        eps: f64,
        /// Use the maximum of past second moments.
        amsgrad: bool,
    },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::AdamW {
            lr: 5e-5,
            beta1: 0.9,
            beta2: 0.999,
            wd: 0.01,
            eps: 1e-8,
            amsgrad: true,
        }
    }
}

impl OptimizerConfig {
    /// Constructs an optimizer over the variables of `vs`.
    pub fn build(&self, vs: &VarStore) -> Result<Optimizer> {
        let mut params = vs.variables().into_iter().collect::<Vec<_>>();
        params.sort_by(|a, b| a.0.cmp(&b.0));
        let state = params
            .iter()
            .map(|(_, p)| Moments {
                exp_avg: p.zeros_like(),
                exp_avg_sq: p.zeros_like(),
                max_exp_avg_sq: p.zeros_like(),
            })
            .collect();

        Ok(Optimizer {
            config: self.clone(),
            params,
            state,
            n_steps: 0,
        })
    }

    /// Returns the learning rate.
    pub fn lr(&self) -> f64 {
        match self {
            Self::Adam { lr } => *lr,
            Self::AdamW { lr, .. } => *lr,
        }
    }

    /// Returns the weight decay, zero for Adam.
    pub fn weight_decay(&self) -> f64 {
        match self {
            Self::Adam { .. } => 0.0,
            Self::AdamW { wd, .. } => *wd,
        }
    }

    fn hyper_params(&self) -> (f64, f64, f64, f64, f64, bool) {
        match *self {
            Self::Adam { lr } => (lr, 0.9, 0.999, 0.0, 1e-8, false),
            Self::AdamW {
                lr,
                beta1,
                beta2,
                wd,
                eps,
                amsgrad,
            } => (lr, beta1, beta2, wd, eps, amsgrad),
        }
    }
}

struct Moments {
    exp_avg: Tensor,
    exp_avg_sq: Tensor,
    max_exp_avg_sq: Tensor,
}

/// Adam family optimizer whose state can be saved in a checkpoint.
pub struct Optimizer {
    config: OptimizerConfig,
    params: Vec<(String, Tensor)>,
    state: Vec<Moments>,
    n_steps: i64,
}

impl Optimizer {
    /// Applies a backward step pass.
    ///
    /// When `clip` is given, every gradient element is clamped into
    /// `[-clip, clip]` before the update. Gradients are zeroed after the update.
    pub fn backward_step(&mut self, loss: &Tensor, clip: Option<f64>) {
        loss.backward();
        if let Some(clip) = clip {
            self.clip_grad_value(clip);
        }
        self.step();
        self.zero_grad();
    }

    /// Clamps gradients element-wise.
    pub fn clip_grad_value(&self, clip: f64) {
        tch::no_grad(|| {
            for (_, p) in self.params.iter() {
                let mut g = p.grad();
                if g.defined() {
                    let _ = g.clamp_(-clip, clip);
                }
            }
        });
    }

    /// Zeroes the gradients of all parameters.
    pub fn zero_grad(&mut self) {
        for (_, p) in self.params.iter_mut() {
            p.zero_grad();
        }
    }

    /// Updates the parameters with their current gradients.
    pub fn step(&mut self) {
        let (lr, beta1, beta2, wd, eps, amsgrad) = self.config.hyper_params();
        self.n_steps += 1;
        let bias_correction1 = 1.0 - beta1.powi(self.n_steps as i32);
        let bias_correction2 = 1.0 - beta2.powi(self.n_steps as i32);

        tch::no_grad(|| {
            for ((_, p), s) in self.params.iter_mut().zip(self.state.iter_mut()) {
                let g = p.grad();
                if !g.defined() {
                    continue;
                }

                if wd != 0.0 {
                    let decayed = &*p * (1.0 - lr * wd);
                    p.copy_(&decayed);
                }

                let exp_avg = &s.exp_avg * beta1 + &g * (1.0 - beta1);
                s.exp_avg.copy_(&exp_avg);
                let exp_avg_sq = &s.exp_avg_sq * beta2 + (&g * &g) * (1.0 - beta2);
                s.exp_avg_sq.copy_(&exp_avg_sq);

                let second = if amsgrad {
                    let max = s.max_exp_avg_sq.maximum(&s.exp_avg_sq);
                    s.max_exp_avg_sq.copy_(&max);
                    &s.max_exp_avg_sq
                } else {
                    &s.exp_avg_sq
                };
                let denom = second.sqrt() / bias_correction2.sqrt() + eps;
                let update = &s.exp_avg / denom * (lr / bias_correction1);
                let updated = &*p - update;
                p.copy_(&updated);
            }
        });
    }

    /// Returns the number of update steps done so far.
    pub fn n_steps(&self) -> i64 {
        self.n_steps
    }

    /// Adds the optimizer state to `named` with keys starting with `prefix`.
    pub fn insert_state(&self, prefix: &str, named: &mut NamedTensors) {
        named.insert_i64(format!("{}.step", prefix), self.n_steps);
        for ((name, _), s) in self.params.iter().zip(self.state.iter()) {
            named.insert(format!("{}.{}.exp_avg", prefix, name), s.exp_avg.to(tch::Device::Cpu));
            named.insert(
                format!("{}.{}.exp_avg_sq", prefix, name),
                s.exp_avg_sq.to(tch::Device::Cpu),
            );
            named.insert(
                format!("{}.{}.max_exp_avg_sq", prefix, name),
                s.max_exp_avg_sq.to(tch::Device::Cpu),
            );
        }
    }

    /// Restores the optimizer state saved with [`Optimizer::insert_state`].
    pub fn load_state(&mut self, prefix: &str, named: &NamedTensors) -> Result<()> {
        for ((name, _), s) in self.params.iter().zip(self.state.iter_mut()) {
            named.copy_into(&format!("{}.{}.exp_avg", prefix, name), &mut s.exp_avg)?;
            named.copy_into(&format!("{}.{}.exp_avg_sq", prefix, name), &mut s.exp_avg_sq)?;
            named.copy_into(
                &format!("{}.{}.max_exp_avg_sq", prefix, name),
                &mut s.max_exp_avg_sq,
            )?;
        }
        self.n_steps = named.get_i64(&format!("{}.step", prefix))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tch::{nn, nn::Module, Device, Kind};

    fn quadratic_loss(lin: &nn::Linear) -> Tensor {
        let xs = Tensor::ones([4, 2], (Kind::Float, Device::Cpu));
        lin.forward(&xs).pow_tensor_scalar(2).mean(Kind::Float)
    }

    #[test]
    fn test_adamw_decreases_loss() {
        let vs = VarStore::new(Device::Cpu);
        let lin = nn::linear(vs.root() / "l", 2, 1, Default::default());
        let mut opt = OptimizerConfig::AdamW {
            lr: 1e-2,
            beta1: 0.9,
            beta2: 0.999,
            wd: 0.01,
            eps: 1e-8,
            amsgrad: true,
        }
        .build(&vs)
        .unwrap();

        let initial = f64::try_from(quadratic_loss(&lin)).unwrap();
        for _ in 0..200 {
            let loss = quadratic_loss(&lin);
            opt.backward_step(&loss, Some(100.0));
        }
        let last = f64::try_from(quadratic_loss(&lin)).unwrap();
        assert!(last < initial);
        assert_eq!(opt.n_steps(), 200);
    }

    #[test]
    fn test_clip_grad_value_bounds_every_element() {
        let vs = VarStore::new(Device::Cpu);
        let lin = nn::linear(vs.root() / "l", 4, 3, Default::default());
        let opt = OptimizerConfig::default().build(&vs).unwrap();
        let xs = Tensor::ones([8, 4], (Kind::Float, Device::Cpu)) * 1.0e4;
        lin.forward(&xs).pow_tensor_scalar(2).sum(Kind::Float).backward();

        let max_grad = |vs: &VarStore| {
            vs.trainable_variables()
                .iter()
                .map(|v| f64::try_from(v.grad().abs().max()).unwrap())
                .fold(0.0, f64::max)
        };
        assert!(max_grad(&vs) > 100.0);

        opt.clip_grad_value(100.0);
        assert!(max_grad(&vs) <= 100.0);
    }

    #[test]
    fn test_gradients_are_zeroed_after_step() {
        let vs = VarStore::new(Device::Cpu);
        let lin = nn::linear(vs.root() / "l", 2, 1, Default::default());
        let mut opt = OptimizerConfig::default().build(&vs).unwrap();
        opt.backward_step(&quadratic_loss(&lin), None);

        for v in vs.trainable_variables() {
            let g = v.grad();
            assert!(!g.defined() || f64::try_from(g.abs().sum(Kind::Float)).unwrap() == 0.0);
        }
    }

    #[test]
    fn test_state_round_trip() {
        let vs = VarStore::new(Device::Cpu);
        let lin = nn::linear(vs.root() / "l", 2, 1, Default::default());
        let mut opt = OptimizerConfig::default().build(&vs).unwrap();
        for _ in 0..3 {
            opt.backward_step(&quadratic_loss(&lin), None);
        }
        let mut named = NamedTensors::default();
        opt.insert_state("optimizer", &mut named);

        let vs2 = VarStore::new(Device::Cpu);
        let _ = nn::linear(vs2.root() / "l", 2, 1, Default::default());
        let mut opt2 = OptimizerConfig::default().build(&vs2).unwrap();
        opt2.load_state("optimizer", &named).unwrap();
        assert_eq!(opt2.n_steps(), 3);

        let mut named2 = NamedTensors::default();
        opt2.insert_state("optimizer", &mut named2);
        for (k, v) in named.named_tensors.iter() {
            let w = named2.get(k).unwrap();
            assert!(v.equal(w), "{} differs", k);
        }
    }
}
