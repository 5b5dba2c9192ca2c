use anyhow::Result;
use blob_dqn_core::error::BlobDqnError;
use std::{collections::HashMap, path::Path};
use tch::{nn::VarStore, Device::Cpu, Tensor};

/// Named tensors stored in a checkpoint file.
///
/// Keys are prefixed with the component they belong to, e.g. `policy_net.` or `optimizer.`.
#[derive(Default)]
pub struct NamedTensors {
    pub named_tensors: HashMap<String, Tensor>,
}

impl NamedTensors {
    /// Copy data of VarStore to CPU, prefixing the variable names.
    pub fn insert_var_store(&mut self, prefix: &str, vs: &VarStore) {
        let src = vs.variables();

        tch::no_grad(|| {
            for (k, v) in src.iter() {
                let v = v.detach().to(Cpu).data();
                self.named_tensors.insert(format!("{}.{}", prefix, k), v);
            }
        });
    }

    /// Inserts a tensor.
    pub fn insert(&mut self, key: impl Into<String>, tensor: Tensor) {
        self.named_tensors.insert(key.into(), tensor);
    }

    /// Inserts a scalar as a 0-dimensional `i64` tensor.
    pub fn insert_i64(&mut self, key: impl Into<String>, v: i64) {
        self.insert(key, Tensor::from(v));
    }

    /// Writes all tensors into a single file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut named = self.named_tensors.iter().collect::<Vec<_>>();
        named.sort_by(|a, b| a.0.cmp(b.0));
        Tensor::save_multi(&named, path)?;
        Ok(())
    }

    /// Reads tensors written with [`NamedTensors::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let named_tensors = Tensor::load_multi(path)?.into_iter().collect();
        Ok(Self { named_tensors })
    }

    /// Returns the tensor of the given key.
    pub fn get(&self, key: &str) -> Result<&Tensor> {
        self.named_tensors
            .get(key)
            .ok_or_else(|| BlobDqnError::CheckpointError(format!("missing key {}", key)).into())
    }

    /// Returns the scalar of the given key.
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        Ok(self.get(key)?.int64_value(&[]))
    }

    /// Copies a tensor of the given key into `dest`, checking its shape.
    pub fn copy_into(&self, key: &str, dest: &mut Tensor) -> Result<()> {
        let src = self.get(key)?;
        if src.size() != dest.size() {
            return Err(BlobDqnError::CheckpointError(format!(
                "shape of {} is {:?} in the checkpoint, {:?} in the model",
                key,
                src.size(),
                dest.size()
            ))
            .into());
        }
        tch::no_grad(|| dest.copy_(src));
        Ok(())
    }

    /// Copies tensors with the given prefix into [`VarStore`].
    ///
    /// Every variable of the [`VarStore`] must be present with the same shape.
    pub fn copy_to_var_store(&self, prefix: &str, vs: &mut VarStore) -> Result<()> {
        for (name, mut dest) in vs.variables() {
            self.copy_into(&format!("{}.{}", prefix, name), &mut dest)?;
        }
        Ok(())
    }
}
