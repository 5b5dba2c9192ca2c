mod config;
use crate::{
    frame::{grayscale_and_resize, FrameStack},
    AtariAct, AtariObs, GameBackend,
};
use anyhow::{bail, Result};
use blob_dqn_core::{record::Record, Env, Step};
pub use config::AtariEnvConfig;
use log::trace;

/// Atari-style environment producing stacked, downscaled grayscale frames.
pub struct AtariEnv<B: GameBackend> {
    backend: B,
    frame_skip: usize,
    max_steps: usize,

    // (width, height) of the screen and of a preprocessed frame
    screen_size: (u32, u32),
    frame_size: (u32, u32),

    frames: FrameStack,

    // Steps in the current episode
    t: usize,
}

impl<B: GameBackend> AtariEnv<B> {
    /// Number of actions of the game.
    pub fn n_actions(&self) -> usize {
        self.backend.n_actions()
    }

    /// Steps taken in the current episode.
    pub fn episode_steps(&self) -> usize {
        self.t
    }

    fn frame(&self) -> Result<Vec<u8>> {
        let (w, h) = self.screen_size;
        let (fw, fh) = self.frame_size;
        grayscale_and_resize(w, h, self.backend.screen_rgb(), fw, fh)
    }

    fn obs(&self) -> AtariObs {
        let (w, h) = self.frame_size;
        AtariObs {
            frames: self.frames.as_slice().to_vec(),
            shape: [self.frames.len(), h as usize, w as usize],
            aux: self.backend.aux(),
        }
    }
}

impl<B: GameBackend> Env for AtariEnv<B> {
    type Config = AtariEnvConfig;
    type Obs = AtariObs;
    type Act = AtariAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        if config.frame_skip == 0 || config.frame_stack == 0 || config.downscale == 0 {
            bail!("frame_skip, frame_stack and downscale must be positive");
        }

        let backend = B::build(config, seed)?;
        let (w, h) = backend.screen_size();
        let frame_size = (w / config.downscale, h / config.downscale);
        if frame_size.0 == 0 || frame_size.1 == 0 {
            bail!(
                "screen {}x{} vanishes when downscaled by {}",
                w,
                h,
                config.downscale
            );
        }
        let frame_len = (frame_size.0 * frame_size.1) as usize;

        Ok(Self {
            backend,
            frame_skip: config.frame_skip,
            max_steps: config.max_steps,
            screen_size: (w, h),
            frame_size,
            frames: FrameStack::new(config.frame_stack, frame_len),
            t: 0,
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.backend.reset();
        self.t = 0;
        let frame = self.frame()?;
        self.frames.fill(&frame);
        Ok(self.obs())
    }

    fn step(&mut self, act: &Self::Act) -> Result<(Step<Self>, Record)> {
        let n_actions = self.backend.n_actions();
        if act.act < 0 || act.act as usize >= n_actions {
            bail!("action {} out of range 0..{}", act.act, n_actions);
        }

        let mut reward = 0f32;
        for _ in 0..self.frame_skip {
            reward += self.backend.act(act.act as usize);
            if self.backend.is_game_over() {
                break;
            }
        }
        self.t += 1;

        let is_terminated = self.backend.is_game_over();
        let is_truncated = !is_terminated && self.t >= self.max_steps;
        let frame = self.frame()?;
        self.frames.push(&frame);
        trace!("step {}: reward {}", self.t, reward);

        let step = Step::new(self.obs(), *act, reward, is_terminated, is_truncated, ());
        Ok((step, Record::empty()))
    }
}
