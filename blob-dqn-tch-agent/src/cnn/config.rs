use anyhow::Result;
use blob_dqn_core::error::BlobDqnError;
use serde::{Deserialize, Serialize};

fn default_pixel_scale() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`PixelCnn`](super::PixelCnn).
pub struct PixelCnnConfig {
    /// Shape `[C, H, W]` of a single observation, fixed by shape binding.
    #[serde(default)]
    pub(crate) in_shape: Option<Vec<i64>>,
    pub(super) channels: Vec<i64>,
    pub(super) kernel_sizes: Vec<i64>,
    pub(super) pool: i64,
    #[serde(default = "default_pixel_scale")]
    pub(super) pixel_scale: f64,
}

impl Default for PixelCnnConfig {
    fn default() -> Self {
        Self {
            in_shape: None,
            channels: vec![16, 8],
            kernel_sizes: vec![5, 4],
            pool: 3,
            pixel_scale: default_pixel_scale(),
        }
    }
}

impl PixelCnnConfig {
    /// Sets the output channels and kernel sizes of the convolution layers.
    pub fn conv_layers(mut self, channels: Vec<i64>, kernel_sizes: Vec<i64>) -> Self {
        self.channels = channels;
        self.kernel_sizes = kernel_sizes;
        self
    }

    /// Sets the kernel size of the max pooling layer.
    pub fn pool(mut self, v: i64) -> Self {
        self.pool = v;
        self
    }

    /// Sets the factor applied to pixel intensities, e.g. `1.0 / 255.0` to
    /// normalize them into `[0, 1]`. Intensities are not scaled by default.
    pub fn pixel_scale(mut self, v: f64) -> Self {
        self.pixel_scale = v;
        self
    }

    /// Sets the input shape `[C, H, W]`.
    pub fn in_shape(mut self, v: Vec<i64>) -> Self {
        self.in_shape = Some(v);
        self
    }

    /// Returns the input shape, failing if it has not been bound.
    pub fn get_in_shape(&self) -> Result<&[i64]> {
        match &self.in_shape {
            Some(s) if s.len() == 3 => Ok(s),
            Some(s) => Err(BlobDqnError::ShapeError(format!(
                "pixel input must be [C, H, W], got {:?}",
                s
            ))
            .into()),
            None => Err(BlobDqnError::ShapeError("pixel input shape is not bound".into()).into()),
        }
    }

    /// Computes the size of the flattened feature map.
    ///
    /// Fails when the convolutions and the pooling shrink the image to nothing.
    pub fn out_dim(&self) -> Result<i64> {
        if self.channels.len() != self.kernel_sizes.len() {
            return Err(BlobDqnError::ShapeError(format!(
                "{} conv channels given with {} kernel sizes",
                self.channels.len(),
                self.kernel_sizes.len()
            ))
            .into());
        }

        let shape = self.get_in_shape()?;
        let (mut h, mut w) = (shape[1], shape[2]);
        for &k in self.kernel_sizes.iter() {
            h -= k - 1;
            w -= k - 1;
        }
        if self.pool > 1 {
            if h < self.pool || w < self.pool {
                h = 0;
            } else {
                h = (h - self.pool) / self.pool + 1;
                w = (w - self.pool) / self.pool + 1;
            }
        }
        if h <= 0 || w <= 0 {
            return Err(BlobDqnError::ShapeError(format!(
                "input {:?} collapses to zero size",
                shape
            ))
            .into());
        }

        let c = *self.channels.last().unwrap_or(&shape[0]);
        Ok(c * h * w)
    }
}
