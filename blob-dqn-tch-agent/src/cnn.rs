//! Convolutional feature extractor for small stacked grayscale frames.
//!
//! The input array is cast from `u8` to `f32` and scaled by `pixel_scale`.
//! The output is the flattened feature map, without any linear layer.
mod base;
mod config;
pub use base::PixelCnn;
pub use config::PixelCnnConfig;
