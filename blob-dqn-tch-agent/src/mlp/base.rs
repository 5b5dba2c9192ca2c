use super::MlpConfig;
use crate::model::SubModel;
use anyhow::Result;
use tch::{nn, nn::Module, Device, Tensor};

/// Multilayer perceptron with a configurable activation function.
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    seq: nn::Sequential,
}

impl Mlp {
    fn create_net(p: &nn::Path, config: &MlpConfig) -> nn::Sequential {
        let mut seq = nn::seq();
        let mut in_dim = config.in_dim;
        let activation = config.activation;

        for (i, &out_dim) in config.units.iter().enumerate() {
            seq = seq.add(nn::linear(
                p / format!("{}{}", "ln", i),
                in_dim,
                out_dim,
                Default::default(),
            ));
            seq = seq.add_fn(move |x| activation.apply(x));
            in_dim = out_dim;
        }

        seq = seq.add(nn::linear(
            p / format!("{}{}", "ln", config.units.len()),
            in_dim,
            config.out_dim,
            Default::default(),
        ));

        if config.activation_out {
            seq = seq.add_fn(move |x| activation.apply(x));
        }

        seq
    }

    /// Builds an MLP whose variables live under the given path.
    pub fn with_path(p: &nn::Path, config: MlpConfig) -> Self {
        let device = p.device();
        let seq = Self::create_net(p, &config);

        Self {
            config,
            device,
            seq,
        }
    }

    /// Builds an MLP with the same configuration under another path.
    pub fn clone_with_path(&self, p: &nn::Path) -> Self {
        Self::with_path(p, self.config.clone())
    }

    /// Configuration of the MLP.
    pub fn config(&self) -> &MlpConfig {
        &self.config
    }
}

impl SubModel for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, x: &Self::Input) -> Tensor {
        self.seq.forward(&x.to(self.device))
    }

    fn build(var_store: &nn::VarStore, config: Self::Config) -> Result<Self> {
        Ok(Self::with_path(&(var_store.root() / "mlp"), config))
    }

    fn clone_with_var_store(&self, var_store: &nn::VarStore) -> Self {
        self.clone_with_path(&(var_store.root() / "mlp"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mlp::Activation;
    use tch::{nn::VarStore, Kind};

    #[test]
    fn test_forward_shape() {
        let vs = VarStore::new(Device::Cpu);
        let config = MlpConfig::new(5, vec![16, 8], 3, false);
        let mlp = Mlp::build(&vs, config).unwrap();
        let ys = mlp.forward(&Tensor::zeros([4, 5], (Kind::Float, Device::Cpu)));
        assert_eq!(ys.size(), [4, 3]);
        assert_eq!(vs.variables().len(), 6);
    }

    #[test]
    fn test_tanh_output_is_bounded() {
        let vs = VarStore::new(Device::Cpu);
        let config = MlpConfig::new(2, vec![4], 3, true).activation(Activation::Tanh);
        let mlp = Mlp::build(&vs, config).unwrap();
        let xs = Tensor::ones([2, 2], (Kind::Float, Device::Cpu)) * 1.0e3;
        let m = f64::try_from(mlp.forward(&xs).abs().max()).unwrap();
        assert!(m <= 1.0);
    }
}
