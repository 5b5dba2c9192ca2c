use super::PixelCnnConfig;
use crate::model::SubModel;
use anyhow::Result;
use tch::{nn, nn::Module, Device, Kind, Tensor};

/// Convolution layers followed by max pooling and flattening.
pub struct PixelCnn {
    config: PixelCnnConfig,
    out_dim: i64,
    device: Device,
    seq: nn::Sequential,
}

impl PixelCnn {
    fn create_net(p: &nn::Path, config: &PixelCnnConfig, in_channels: i64) -> nn::Sequential {
        let scale = config.pixel_scale;
        let pool = config.pool;
        let mut seq = nn::seq().add_fn(move |xs| xs.to_kind(Kind::Float) * scale);
        let mut in_c = in_channels;

        for (i, (&out_c, &k)) in config
            .channels
            .iter()
            .zip(config.kernel_sizes.iter())
            .enumerate()
        {
            seq = seq
                .add(nn::conv2d(
                    p / format!("c{}", i + 1),
                    in_c,
                    out_c,
                    k,
                    Default::default(),
                ))
                .add_fn(|xs| xs.relu());
            in_c = out_c;
        }

        if pool > 1 {
            seq = seq.add_fn(move |xs| xs.max_pool2d(pool, pool, 0, 1, false));
        }

        seq.add_fn(|xs| xs.flat_view())
    }

    /// Builds a CNN whose variables live under the given path.
    pub fn with_path(p: &nn::Path, config: PixelCnnConfig) -> Result<Self> {
        let out_dim = config.out_dim()?;
        let in_channels = config.get_in_shape()?[0];
        let device = p.device();
        let seq = Self::create_net(p, &config, in_channels);

        Ok(Self {
            config,
            out_dim,
            device,
            seq,
        })
    }

    /// Builds a CNN with the same configuration under another path.
    pub fn clone_with_path(&self, p: &nn::Path) -> Self {
        let in_channels = self.config.in_shape.as_ref().map_or(1, |s| s[0]);

        Self {
            config: self.config.clone(),
            out_dim: self.out_dim,
            device: p.device(),
            seq: Self::create_net(p, &self.config, in_channels),
        }
    }

    /// Size of the flattened feature map.
    pub fn out_dim(&self) -> i64 {
        self.out_dim
    }
}

impl SubModel for PixelCnn {
    type Config = PixelCnnConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, x: &Self::Input) -> Tensor {
        self.seq.forward(&x.to(self.device))
    }

    fn build(var_store: &nn::VarStore, config: Self::Config) -> Result<Self> {
        Self::with_path(&(var_store.root() / "cnn"), config)
    }

    fn clone_with_var_store(&self, var_store: &nn::VarStore) -> Self {
        self.clone_with_path(&(var_store.root() / "cnn"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tch::nn::VarStore;

    #[test]
    fn test_forward_matches_computed_out_dim() {
        let vs = VarStore::new(Device::Cpu);
        let config = PixelCnnConfig::default().in_shape(vec![3, 21, 16]);
        let cnn = PixelCnn::build(&vs, config).unwrap();
        let xs = Tensor::zeros([2, 3, 21, 16], (Kind::Uint8, Device::Cpu));
        assert_eq!(cnn.forward(&xs).size(), [2, cnn.out_dim()]);
    }

    #[test]
    fn test_build_with_unbound_shape_fails() {
        let vs = VarStore::new(Device::Cpu);
        assert!(PixelCnn::build(&vs, PixelCnnConfig::default()).is_err());
    }
}
