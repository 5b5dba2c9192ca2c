use super::DqnModelConfig;
use crate::{
    model::{ModelBase, SubModel},
    opt::{Optimizer, OptimizerConfig},
    util::{NamedTensors, OutDim},
};
use anyhow::{anyhow, Result};
use log::{trace, warn};
use serde::{de::DeserializeOwned, Serialize};
use tch::{nn, Device, Tensor};

/// Represents value functions for DQN agents.
pub struct DqnModel<Q>
where
    Q: SubModel<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    device: Device,
    var_store: nn::VarStore,

    // Dimension of the output vector (equal to the number of actions).
    pub(super) out_dim: i64,

    // Action-value function
    q: Q,

    // Optimizer, absent on target networks
    opt_config: OptimizerConfig,
    opt: Option<Optimizer>,

    // Element-wise gradient clamp applied before each optimizer step
    clip_grad_value: Option<f64>,
}

impl<Q> DqnModel<Q>
where
    Q: SubModel<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Builds the model.
    ///
    /// Fails when the configuration of the action-value function is missing
    /// or does not fix every layer shape.
    pub fn build(
        config: DqnModelConfig<Q::Config>,
        clip_grad_value: Option<f64>,
        device: Device,
    ) -> Result<Self> {
        let q_config = config
            .q_config
            .ok_or_else(|| anyhow!("configuration of the action-value function is missing"))?;
        let out_dim = q_config.get_out_dim();
        let var_store = nn::VarStore::new(device);
        let q = Q::build(&var_store, q_config)?;
        let opt = config.opt_config.build(&var_store)?;

        Ok(Self {
            device,
            var_store,
            out_dim,
            q,
            opt_config: config.opt_config,
            opt: Some(opt),
            clip_grad_value,
        })
    }

    /// Creates a model with the same architecture and a copy of the parameters.
    ///
    /// Used to create the target network, which is only updated by tracking
    /// and so has no optimizer.
    pub fn try_clone(&self) -> Result<Self> {
        let device = self.device;
        let mut var_store = nn::VarStore::new(device);
        let q = self.q.clone_with_var_store(&var_store);
        var_store.copy(&self.var_store)?;

        Ok(Self {
            device,
            var_store,
            out_dim: self.out_dim,
            q,
            opt_config: self.opt_config.clone(),
            opt: None,
            clip_grad_value: self.clip_grad_value,
        })
    }

    /// Outputs the action-value given an observation.
    pub fn forward(&self, x: &Q::Input) -> Tensor {
        let a = self.q.forward(x);
        debug_assert_eq!(a.size().as_slice()[1], self.out_dim);
        a
    }

    /// Number of actions.
    pub fn out_dim(&self) -> i64 {
        self.out_dim
    }

    /// Returns `true` if the model owns an optimizer.
    pub fn has_optimizer(&self) -> bool {
        self.opt.is_some()
    }

    /// Adds parameters and optimizer state under the given prefixes.
    pub(crate) fn insert_named(
        &self,
        prefix: &str,
        opt_prefix: Option<&str>,
        named: &mut NamedTensors,
    ) {
        named.insert_var_store(prefix, &self.var_store);
        if let (Some(opt_prefix), Some(opt)) = (opt_prefix, &self.opt) {
            opt.insert_state(opt_prefix, named);
        }
    }

    /// Restores parameters and optimizer state saved with `insert_named`.
    pub(crate) fn load_named(
        &mut self,
        prefix: &str,
        opt_prefix: Option<&str>,
        named: &NamedTensors,
    ) -> Result<()> {
        named.copy_to_var_store(prefix, &mut self.var_store)?;
        if let (Some(opt_prefix), Some(opt)) = (opt_prefix, &mut self.opt) {
            opt.load_state(opt_prefix, named)?;
        }
        trace!("Loaded variables with prefix {}", prefix);
        Ok(())
    }
}

impl<Q> ModelBase for DqnModel<Q>
where
    Q: SubModel<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    fn backward_step(&mut self, loss: &Tensor) {
        match &mut self.opt {
            Some(opt) => opt.backward_step(loss, self.clip_grad_value),
            None => warn!("backward step on a model without optimizer ignored"),
        }
    }

    fn get_var_store_mut(&mut self) -> &mut nn::VarStore {
        &mut self.var_store
    }

    fn get_var_store(&self) -> &nn::VarStore {
        &self.var_store
    }
}
