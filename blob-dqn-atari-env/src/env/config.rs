//! Configuration of [`AtariEnv`](super::AtariEnv).
//!
//! If environment variable `ATARI_ROM_DIR` exists, it is used as the directory
//! from which ROM images of the Atari games are loaded.
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    env,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Configurations of [`AtariEnv`](super::AtariEnv).
pub struct AtariEnvConfig {
    pub(crate) rom_dir: String,
    pub(crate) name: String,

    /// Frames an action is repeated for; rewards are summed.
    pub(crate) frame_skip: usize,
    pub(crate) frame_stack: usize,

    /// Steps after which an episode is truncated.
    pub(crate) max_steps: usize,

    /// Screens are shrunk by this factor in both directions.
    pub(crate) downscale: u32,

    pub(crate) ram_features: bool,

    /// Frame skip inside the emulator.
    pub(crate) ale_frame_skip: usize,
    pub(crate) sticky_action_prob: f32,
}

impl Default for AtariEnvConfig {
    fn default() -> Self {
        let rom_dir = if let Ok(var) = env::var("ATARI_ROM_DIR") {
            var
        } else {
            "".to_string()
        };

        Self {
            rom_dir,
            name: "pong".to_string(),
            frame_skip: 1,
            frame_stack: 3,
            max_steps: 600,
            downscale: 10,
            ram_features: false,
            ale_frame_skip: 4,
            sticky_action_prob: 0.25,
        }
    }
}

impl AtariEnvConfig {
    /// Sets the name of the game.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the directory of ROM images.
    pub fn rom_dir(mut self, rom_dir: impl Into<String>) -> Self {
        self.rom_dir = rom_dir.into();
        self
    }

    /// Sets the number of frames an action is repeated for.
    pub fn frame_skip(mut self, v: usize) -> Self {
        self.frame_skip = v;
        self
    }

    /// Sets the number of stacked frames.
    pub fn frame_stack(mut self, v: usize) -> Self {
        self.frame_stack = v;
        self
    }

    /// Sets the step cap of an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the downscale factor of screens.
    pub fn downscale(mut self, v: u32) -> Self {
        self.downscale = v;
        self
    }

    /// Supplies the console RAM as auxiliary features.
    pub fn ram_features(mut self, v: bool) -> Self {
        self.ram_features = v;
        self
    }

    /// Returns the name of the game.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns the frame skip.
    pub fn get_frame_skip(&self) -> usize {
        self.frame_skip
    }

    /// Path of the ROM image of the game.
    pub fn rom_path(&self) -> PathBuf {
        Path::new(&self.rom_dir).join(format!("{}.bin", self.name))
    }

    /// Loads [`AtariEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of Atari env from {:?}", path_);
        Ok(b)
    }

    /// Saves [`AtariEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
