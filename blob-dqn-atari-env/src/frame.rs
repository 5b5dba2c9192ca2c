//! Frame preprocessing.
use anyhow::{anyhow, Result};
use image::{
    imageops::{grayscale, resize, FilterType::Triangle},
    ImageBuffer, Rgb,
};

/// Converts an RGB screen of `width x height` to grayscale and resizes it.
///
/// Returns `out_height * out_width` intensities in row-major order.
pub fn grayscale_and_resize(
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    out_width: u32,
    out_height: u32,
) -> Result<Vec<u8>> {
    let img = ImageBuffer::<Rgb<u8>, _>::from_vec(width, height, rgb)
        .ok_or_else(|| anyhow!("screen buffer does not match {}x{} RGB", width, height))?;
    let img = grayscale(&img);
    let img = resize(&img, out_width, out_height, Triangle);
    Ok(img.into_raw())
}

/// The last `n` frames, oldest first, in one contiguous buffer.
#[derive(Debug, Clone)]
pub struct FrameStack {
    n: usize,
    frame_len: usize,
    frames: Vec<u8>,
}

impl FrameStack {
    /// Creates a stack of `n` frames of `frame_len` bytes each, all zero.
    pub fn new(n: usize, frame_len: usize) -> Self {
        Self {
            n,
            frame_len,
            frames: vec![0; n * frame_len],
        }
    }

    /// Overwrites every slot with `frame`, as done at the start of an episode.
    pub fn fill(&mut self, frame: &[u8]) {
        debug_assert_eq!(frame.len(), self.frame_len);
        for slot in self.frames.chunks_exact_mut(self.frame_len) {
            slot.copy_from_slice(frame);
        }
    }

    /// Drops the oldest frame and appends `frame`.
    pub fn push(&mut self, frame: &[u8]) {
        debug_assert_eq!(frame.len(), self.frame_len);
        if self.n == 0 {
            return;
        }
        self.frames.copy_within(self.frame_len.., 0);
        let last = (self.n - 1) * self.frame_len;
        self.frames[last..].copy_from_slice(frame);
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Returns `true` if the stack holds no frames.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// All frames as one buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.frames
    }
}
