//! DQN agent implemented with tch-rs.
use super::{config::DqnConfig, explorer::EpsilonGreedy, model::DqnModel};
use crate::{
    model::{ModelBase, SubModel},
    qnet::StackObs,
    util::{track, NamedTensors, OutDim},
};
use anyhow::Result;
use blob_dqn_core::{
    checkpoint::Epoch,
    error::BlobDqnError,
    record::{Record, RecordValue},
    Agent, Env, ExperienceBufferBase, Policy, ReplayBufferBase, TransitionBatch,
};
use log::{debug, info};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, marker::PhantomData, path::Path};
use tch::{no_grad, Device, Kind, Tensor};

const POLICY_NET: &str = "policy_net";
const TARGET_NET: &str = "loss_module";
const OPTIMIZER: &str = "optimizer";
const EXPLORER_STEP: &str = "explorer.step";
const EPOCH: &str = "epoch";

/// Computes the one-step TD target.
///
/// `reward + discount_factor * (1 - is_terminated) * next_q`.
/// Transitions cut off by a step cap are not terminal and keep the bootstrap term.
pub fn td_target(
    reward: &Tensor,
    is_terminated: &Tensor,
    next_q: &Tensor,
    discount_factor: f64,
) -> Tensor {
    reward + (1.0 - is_terminated.to_kind(Kind::Float)) * discount_factor * next_q
}

/// DQN agent implemented with tch-rs.
pub struct Dqn<E, Q, R>
where
    E: Env,
    Q: SubModel<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: StackObs<Input = Q::Input>,
    E::Act: From<i64> + Into<i64>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch<ObsBatch = Vec<E::Obs>, ActBatch = Vec<E::Act>>,
{
    pub(in crate::dqn) min_transitions_warmup: usize,
    pub(in crate::dqn) batch_size: usize,
    pub(in crate::dqn) qnet: DqnModel<Q>,
    pub(in crate::dqn) qnet_tgt: DqnModel<Q>,
    pub(in crate::dqn) train: bool,
    pub(in crate::dqn) phantom: PhantomData<(E, R)>,
    pub(in crate::dqn) discount_factor: f64,
    pub(in crate::dqn) tau: f64,
    pub(in crate::dqn) explorer: EpsilonGreedy,
    pub(in crate::dqn) device: Device,
    pub(in crate::dqn) n_opts: usize,
    pub(in crate::dqn) double_dqn: bool,
}

impl<E, Q, R> Dqn<E, Q, R>
where
    E: Env,
    Q: SubModel<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: StackObs<Input = Q::Input>,
    E::Act: From<i64> + Into<i64>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch<ObsBatch = Vec<E::Obs>, ActBatch = Vec<E::Act>>,
{
    /// Constructs DQN agent.
    ///
    /// The configuration of the action-value function must have its input
    /// shapes bound. The target network starts as a copy of the policy network.
    pub fn build(config: DqnConfig<Q>) -> Result<Self> {
        let device = config.device.map_or(Device::Cpu, |d| d.into());
        let qnet = DqnModel::build(config.model_config, config.clip_grad_value, device)?;
        let qnet_tgt = qnet.try_clone()?;

        Ok(Dqn {
            qnet,
            qnet_tgt,
            min_transitions_warmup: config.min_transitions_warmup,
            batch_size: config.batch_size,
            discount_factor: config.discount_factor,
            tau: config.tau,
            train: config.train,
            explorer: config.explorer,
            device,
            n_opts: 0,
            double_dqn: config.double_dqn,
            phantom: PhantomData,
        })
    }

    /// Returns the explorer.
    pub fn explorer(&self) -> &EpsilonGreedy {
        &self.explorer
    }

    /// Returns the number of optimization steps done so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Returns the action values of the policy network.
    pub fn action_values(&self, obs: &[E::Obs]) -> Tensor {
        no_grad(|| self.qnet.forward(&<E::Obs as StackObs>::stack(obs)))
    }

    /// Returns the action values of the target network.
    pub fn target_action_values(&self, obs: &[E::Obs]) -> Tensor {
        no_grad(|| self.qnet_tgt.forward(&<E::Obs as StackObs>::stack(obs)))
    }

    /// Returns the values of next observations bootstrapped in the TD target.
    ///
    /// With double DQN the action is chosen by the policy network and valued by
    /// the target network, otherwise the target network's maximum is taken.
    pub fn next_action_values(&self, next_obs: &[E::Obs]) -> Tensor {
        no_grad(|| self.bootstrap_values(&<E::Obs as StackObs>::stack(next_obs)))
    }

    fn bootstrap_values(&self, next_obs: &Q::Input) -> Tensor {
        if self.double_dqn {
            let x = self.qnet.forward(next_obs);
            let y = x.argmax(-1, false).unsqueeze(-1);
            self.qnet_tgt
                .forward(next_obs)
                .gather(-1, &y, false)
                .squeeze_dim(-1)
        } else {
            let x = self.qnet_tgt.forward(next_obs);
            x.max_dim(-1, false).0
        }
    }

    fn update_critic(&mut self, buffer: &mut R) -> Result<f32> {
        let batch = buffer.batch(self.batch_size)?;
        let (obs, act, next_obs, reward, is_terminated, _) = batch.unpack();
        let obs = <E::Obs as StackObs>::stack(&obs);
        let next_obs = <E::Obs as StackObs>::stack(&next_obs);
        let act = act.into_iter().map(|a| a.into()).collect::<Vec<i64>>();
        let act = Tensor::from_slice(&act).unsqueeze(-1).to(self.device);
        let reward = Tensor::from_slice(&reward[..]).to(self.device);
        let is_terminated = Tensor::from_slice(&is_terminated[..]).to(self.device);

        let pred = {
            let x = self.qnet.forward(&obs);
            x.gather(-1, &act, false).squeeze_dim(-1)
        };

        let tgt = no_grad(|| {
            let q = self.bootstrap_values(&next_obs);
            td_target(&reward, &is_terminated, &q, self.discount_factor)
        });

        let loss = pred.smooth_l1_loss(&tgt, tch::Reduction::Mean, 1.0);
        let loss_value = f32::try_from(&loss)?;
        if !loss_value.is_finite() {
            return Err(BlobDqnError::NonFiniteLoss {
                loss: loss_value,
                opt_steps: self.n_opts,
            }
            .into());
        }
        self.qnet.backward_step(&loss);

        Ok(loss_value)
    }

    fn opt_(&mut self, buffer: &mut R) -> Result<Record> {
        let loss = self.update_critic(buffer)?;
        track(
            self.qnet_tgt.get_var_store_mut(),
            self.qnet.get_var_store(),
            self.tau,
        );
        self.n_opts += 1;

        Ok(Record::from_slice(&[
            ("loss", RecordValue::Scalar(loss)),
            ("epsilon", RecordValue::Scalar(self.explorer.eps() as f32)),
        ]))
    }
}

impl<E, Q, R> Policy<E> for Dqn<E, Q, R>
where
    E: Env,
    Q: SubModel<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: StackObs<Input = Q::Input>,
    E::Act: From<i64> + Into<i64>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch<ObsBatch = Vec<E::Obs>, ActBatch = Vec<E::Act>>,
{
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        let n_actions = self.qnet.out_dim();
        let a = no_grad(|| {
            let input = <E::Obs as StackObs>::stack(std::slice::from_ref(obs));
            if self.train {
                let qnet = &self.qnet;
                self.explorer.action(|| qnet.forward(&input), n_actions)
            } else {
                self.qnet
                    .forward(&input)
                    .argmax(-1, false)
                    .int64_value(&[0])
            }
        });
        a.into()
    }
}

impl<E, Q, R> Agent<E, R> for Dqn<E, Q, R>
where
    E: Env,
    Q: SubModel<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: StackObs<Input = Q::Input>,
    E::Act: From<i64> + Into<i64>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch<ObsBatch = Vec<E::Obs>, ActBatch = Vec<E::Act>>,
    R: ExperienceBufferBase,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt_with_record(&mut self, buffer: &mut R) -> Result<Option<Record>> {
        if buffer.len() >= self.min_transitions_warmup {
            Ok(Some(self.opt_(buffer)?))
        } else {
            Ok(None)
        }
    }

    fn save_params(&self, path: &Path, epoch: Epoch) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut named = NamedTensors::default();
        self.qnet.insert_named(POLICY_NET, Some(OPTIMIZER), &mut named);
        self.qnet_tgt.insert_named(TARGET_NET, None, &mut named);
        named.insert_i64(EXPLORER_STEP, self.explorer.n_steps as i64);
        named.insert_i64(EPOCH, epoch.to_i64());
        named.save(path)?;
        info!("Save DQN checkpoint to {:?}", path);
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<Epoch> {
        let named = NamedTensors::load(path)?;
        self.qnet.load_named(POLICY_NET, Some(OPTIMIZER), &named)?;
        self.qnet_tgt.load_named(TARGET_NET, None, &named)?;
        self.explorer.n_steps = named.get_i64(EXPLORER_STEP)? as usize;
        let epoch = Epoch::from_i64(named.get_i64(EPOCH)?);
        debug!("explorer step restored to {}", self.explorer.n_steps);
        info!("Load DQN checkpoint from {:?}", path);
        Ok(epoch)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_terminal_target_is_reward() {
        let reward = Tensor::from_slice(&[1.0f32, -1.0, 0.5]);
        let is_terminated = Tensor::from_slice(&[1i8, 1, 1]);
        let next_q = Tensor::from_slice(&[10.0f32, 20.0, 30.0]);
        let tgt = td_target(&reward, &is_terminated, &next_q, 0.99);
        assert!(tgt.allclose(&reward, 1e-6, 1e-6, false));
    }

    #[test]
    fn test_non_terminal_target_bootstraps() {
        let reward = Tensor::from_slice(&[1.0f32, 0.0]);
        let is_terminated = Tensor::from_slice(&[0i8, 1]);
        let next_q = Tensor::from_slice(&[2.0f32, 5.0]);
        let tgt = td_target(&reward, &is_terminated, &next_q, 0.5);
        let expected = Tensor::from_slice(&[2.0f32, 0.0]);
        assert!(tgt.allclose(&expected, 1e-6, 1e-6, false));
    }
}
