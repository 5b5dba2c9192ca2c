//! Arcade Learning Environment backend.
use super::GameBackend;
use crate::AtariEnvConfig;
use anyhow::{anyhow, bail, Result};
use c_str_macro::c_str;
use log::info;
use std::{ffi::CString, path::Path};

/// Owned handle of an ALE instance.
struct Ale {
    inner: *mut atari_env_sys::ALEInterface,
}

impl Drop for Ale {
    fn drop(&mut self) {
        unsafe {
            atari_env_sys::ALE_del(self.inner);
        }
    }
}

impl Ale {
    fn new(
        rom_path: &Path,
        seed: i32,
        frame_skip: i32,
        repeat_action_probability: f32,
    ) -> Result<Self> {
        let rom_path = rom_path
            .to_str()
            .ok_or_else(|| anyhow!("ROM path {:?} is not valid UTF-8", rom_path))?;
        let rom_path = CString::new(rom_path)?;

        let ale = unsafe { atari_env_sys::ALE_new() };
        unsafe {
            atari_env_sys::setInt(ale, c_str!("random_seed").as_ptr(), seed);
            atari_env_sys::setBool(ale, c_str!("display_screen").as_ptr(), false);
            atari_env_sys::setBool(ale, c_str!("sound").as_ptr(), false);
            atari_env_sys::setBool(ale, c_str!("color_averaging").as_ptr(), false);
            atari_env_sys::setInt(ale, c_str!("frame_skip").as_ptr(), frame_skip);
            atari_env_sys::setFloat(
                ale,
                c_str!("repeat_action_probability").as_ptr(),
                repeat_action_probability,
            );
            atari_env_sys::loadROM(ale, rom_path.as_ptr());
            atari_env_sys::reset_game(ale);
        }

        Ok(Self { inner: ale })
    }

    fn minimal_actions(&self) -> Vec<i32> {
        let n = unsafe { atari_env_sys::getMinimalActionSize(self.inner) } as usize;
        let mut buf = vec![0i32; n];
        unsafe {
            atari_env_sys::getMinimalActionSet(self.inner, buf.as_mut_ptr());
        }
        buf
    }

    fn is_game_over(&self) -> bool {
        unsafe { atari_env_sys::game_over(self.inner) }
    }

    fn reset(&mut self) {
        unsafe {
            atari_env_sys::reset_game(self.inner);
        }
    }

    fn act(&mut self, action: i32) -> i32 {
        unsafe { atari_env_sys::act(self.inner, action) }
    }

    fn width(&self) -> u32 {
        unsafe { atari_env_sys::getScreenWidth(self.inner) as u32 }
    }

    fn height(&self) -> u32 {
        unsafe { atari_env_sys::getScreenHeight(self.inner) as u32 }
    }

    /// Always RGB regardless of endianness.
    fn rgb24(&self, buf: &mut [u8]) {
        unsafe {
            atari_env_sys::getScreenRGB2(self.inner, buf.as_mut_ptr());
        }
    }

    fn ram_size(&self) -> usize {
        unsafe { atari_env_sys::getRAMSize(self.inner) as usize }
    }

    fn ram(&self, buf: &mut [u8]) {
        unsafe {
            atari_env_sys::getRAM(self.inner, buf.as_mut_ptr());
        }
    }
}

/// Runs `$rom_dir/<name>.bin` on the Arcade Learning Environment.
///
/// Only the minimal action set of the game is exposed. With `ram_features`,
/// the console RAM scaled to `[0, 1]` is supplied as auxiliary features.
pub struct AleBackend {
    ale: Ale,
    actions: Vec<i32>,
    ram_features: bool,
}

impl GameBackend for AleBackend {
    fn build(config: &AtariEnvConfig, seed: i64) -> Result<Self> {
        let rom_path = config.rom_path();
        if !rom_path.is_file() {
            bail!(
                "ROM {:?} not found, set ATARI_ROM_DIR to the directory of ROM images",
                rom_path
            );
        }

        let ale = Ale::new(
            &rom_path,
            seed as i32,
            config.ale_frame_skip as i32,
            config.sticky_action_prob,
        )?;
        let actions = ale.minimal_actions();
        info!(
            "Loaded {:?}: {} actions, screen {}x{}",
            rom_path,
            actions.len(),
            ale.width(),
            ale.height()
        );

        Ok(Self {
            ale,
            actions,
            ram_features: config.ram_features,
        })
    }

    fn n_actions(&self) -> usize {
        self.actions.len()
    }

    fn reset(&mut self) {
        self.ale.reset();
    }

    fn act(&mut self, action: usize) -> f32 {
        self.ale.act(self.actions[action]) as f32
    }

    fn is_game_over(&self) -> bool {
        self.ale.is_game_over()
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.ale.width(), self.ale.height())
    }

    fn screen_rgb(&self) -> Vec<u8> {
        let (w, h) = self.screen_size();
        let mut buf = vec![0u8; (w * h * 3) as usize];
        self.ale.rgb24(&mut buf);
        buf
    }

    fn aux(&self) -> Vec<f32> {
        if !self.ram_features {
            return vec![];
        }
        let mut buf = vec![0u8; self.ale.ram_size()];
        self.ale.ram(&mut buf);
        buf.into_iter().map(|b| b as f32 / 255.0).collect()
    }
}
