use super::PixelInput;
use crate::{cnn::PixelCnnConfig, util::OutDim};
use anyhow::Result;
use blob_dqn_core::error::BlobDqnError;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`QNet`](super::QNet).
pub struct QNetConfig {
    pub(super) cnn: PixelCnnConfig,
    pub(super) aux_units: Vec<i64>,
    pub(super) head_units: Vec<i64>,
    #[serde(default)]
    pub(super) aux_dim: Option<i64>,
    pub(super) out_dim: i64,
}

impl Default for QNetConfig {
    fn default() -> Self {
        Self {
            cnn: PixelCnnConfig::default(),
            aux_units: vec![256, 128],
            head_units: vec![128, 64],
            aux_dim: None,
            out_dim: 0,
        }
    }
}

impl QNetConfig {
    /// Sets the configuration of the convolution pipeline.
    pub fn cnn(mut self, v: PixelCnnConfig) -> Self {
        self.cnn = v;
        self
    }

    /// Sets the hidden units of the auxiliary pipeline.
    pub fn aux_units(mut self, v: Vec<i64>) -> Self {
        self.aux_units = v;
        self
    }

    /// Sets the hidden units of the head.
    pub fn head_units(mut self, v: Vec<i64>) -> Self {
        self.head_units = v;
        self
    }

    /// Fixes the input shapes from a sample input with a batch dimension.
    ///
    /// Fails if the convolution pipeline would reduce the frames to nothing.
    pub fn bind_shapes(&mut self, sample: &PixelInput) -> Result<()> {
        let pixels = sample.pixels.size();
        let aux = sample.aux.size();
        if pixels.len() != 4 || aux.len() != 2 {
            return Err(BlobDqnError::ShapeError(format!(
                "expected pixels [B, C, H, W] and aux [B, A], got {:?} and {:?}",
                pixels, aux
            ))
            .into());
        }

        self.cnn.in_shape = Some(pixels[1..].to_vec());
        self.aux_dim = Some(aux[1]);
        let n_features = self.cnn.out_dim()?;
        info!(
            "Bound shapes: pixels {:?}, aux {}, {} conv features",
            &pixels[1..],
            aux[1],
            n_features
        );
        Ok(())
    }

    /// Returns `true` if the input shapes are fixed.
    pub fn is_bound(&self) -> bool {
        self.cnn.in_shape.is_some() && self.aux_dim.is_some()
    }

    /// Returns the auxiliary dimension, failing if it has not been bound.
    pub fn get_aux_dim(&self) -> Result<i64> {
        self.aux_dim
            .ok_or_else(|| BlobDqnError::ShapeError("aux dimension is not bound".into()).into())
    }
}

impl OutDim for QNetConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, v: i64) {
        self.out_dim = v;
    }
}
