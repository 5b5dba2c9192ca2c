use super::{PixelInput, QNetConfig};
use crate::{
    cnn::PixelCnn,
    mlp::{Activation, Mlp, MlpConfig},
    model::SubModel,
};
use anyhow::Result;
use blob_dqn_core::error::BlobDqnError;
use tch::{nn, Device, Kind, Tensor};

/// Action-value network with a convolution pipeline, an auxiliary MLP and a head.
pub struct QNet {
    config: QNetConfig,
    device: Device,
    aux_dim: i64,
    cnn: PixelCnn,
    aux: Option<Mlp>,
    head: Mlp,
}

impl SubModel for QNet {
    type Config = QNetConfig;
    type Input = PixelInput;
    type Output = Tensor;

    fn build(var_store: &nn::VarStore, config: Self::Config) -> Result<Self> {
        if config.out_dim <= 0 {
            return Err(BlobDqnError::ShapeError("the number of actions is not set".into()).into());
        }
        let aux_dim = config.get_aux_dim()?;
        let cnn = PixelCnn::with_path(&(var_store.root() / "cnn"), config.cnn.clone())?;

        let (aux, aux_out) = match config.aux_units.split_last() {
            Some((&last, units)) if aux_dim > 0 => {
                let mlp_config =
                    MlpConfig::new(aux_dim, units.to_vec(), last, true).activation(Activation::Tanh);
                let mlp = Mlp::with_path(&(var_store.root() / "aux"), mlp_config);
                (Some(mlp), last)
            }
            _ => (None, aux_dim),
        };

        let head_config = MlpConfig::new(
            cnn.out_dim() + aux_out,
            config.head_units.clone(),
            config.out_dim,
            false,
        )
        .activation(Activation::Tanh);
        let head = Mlp::with_path(&(var_store.root() / "head"), head_config);

        Ok(Self {
            config,
            device: var_store.device(),
            aux_dim,
            cnn,
            aux,
            head,
        })
    }

    fn clone_with_var_store(&self, var_store: &nn::VarStore) -> Self {
        Self {
            config: self.config.clone(),
            device: var_store.device(),
            aux_dim: self.aux_dim,
            cnn: self.cnn.clone_with_path(&(var_store.root() / "cnn")),
            aux: self
                .aux
                .as_ref()
                .map(|mlp| mlp.clone_with_path(&(var_store.root() / "aux"))),
            head: self.head.clone_with_path(&(var_store.root() / "head")),
        }
    }

    fn forward(&self, input: &Self::Input) -> Tensor {
        let xs = self.cnn.forward(&input.pixels);
        let xs = match &self.aux {
            Some(mlp) => Tensor::cat(&[xs, mlp.forward(&input.aux.to_kind(Kind::Float))], 1),
            None if self.aux_dim > 0 => {
                let aux = input.aux.to_kind(Kind::Float).to(self.device);
                Tensor::cat(&[xs, aux], 1)
            }
            None => xs,
        };
        self.head.forward(&xs)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::OutDim;
    use tch::nn::VarStore;

    fn sample(batch: i64, aux_dim: i64) -> PixelInput {
        PixelInput {
            pixels: Tensor::zeros([batch, 3, 21, 16], (Kind::Uint8, Device::Cpu)),
            aux: Tensor::rand([batch, aux_dim], (Kind::Float, Device::Cpu)),
        }
    }

    fn bound_config(aux_dim: i64) -> QNetConfig {
        let mut config = QNetConfig::default();
        config.set_out_dim(6);
        config.bind_shapes(&sample(1, aux_dim)).unwrap();
        config
    }

    #[test]
    fn test_forward_without_aux() {
        let vs = VarStore::new(Device::Cpu);
        let qnet = QNet::build(&vs, bound_config(0)).unwrap();
        assert_eq!(qnet.forward(&sample(4, 0)).size(), [4, 6]);
        assert!(vs.variables().keys().all(|k| !k.starts_with("aux")));
    }

    #[test]
    fn test_forward_with_aux() {
        let vs = VarStore::new(Device::Cpu);
        let qnet = QNet::build(&vs, bound_config(128)).unwrap();
        assert_eq!(qnet.forward(&sample(5, 128)).size(), [5, 6]);
        assert!(vs.variables().keys().any(|k| k.starts_with("aux")));
    }

    #[test]
    fn test_build_requires_bound_shapes() {
        let vs = VarStore::new(Device::Cpu);
        let mut config = QNetConfig::default();
        config.set_out_dim(6);
        assert!(!config.is_bound());
        assert!(QNet::build(&vs, config).is_err());
    }

    #[test]
    fn test_bind_shapes_rejects_collapsing_input() {
        let mut config = QNetConfig::default();
        let input = PixelInput {
            pixels: Tensor::zeros([1, 3, 8, 8], (Kind::Uint8, Device::Cpu)),
            aux: Tensor::zeros([1, 0], (Kind::Float, Device::Cpu)),
        };
        assert!(config.bind_shapes(&input).is_err());
    }

    #[test]
    fn test_clone_has_same_variables() {
        let vs = VarStore::new(Device::Cpu);
        let qnet = QNet::build(&vs, bound_config(4)).unwrap();
        let vs2 = VarStore::new(Device::Cpu);
        let _ = qnet.clone_with_var_store(&vs2);

        let mut k1 = vs.variables().into_keys().collect::<Vec<_>>();
        let mut k2 = vs2.variables().into_keys().collect::<Vec<_>>();
        k1.sort();
        k2.sort();
        assert_eq!(k1, k2);
    }
}
