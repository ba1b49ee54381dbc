//! Optional tuning file read once at startup.
//!
//! Native builds look for `assets/config/game.json`; anything missing or malformed falls back to
//! defaults so the game always starts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::player::DEFAULT_PLAYER_SPEED;
use crate::theme::LEVEL_COUNT;

pub const CONFIG_PATH: &str = "assets/config/game.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed RNG seed for reproducible runs; entropy when absent.
    pub seed: Option<u64>,
    pub start_level: u8,
    pub player_speed: f32,
    pub gamepad_deadzone: f32,
    pub master_volume: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start_level: 1,
            player_speed: DEFAULT_PLAYER_SPEED,
            gamepad_deadzone: 0.2,
            master_volume: 1.0,
        }
    }
}

impl GameConfig {
    pub fn from_json(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(raw)
            .map(Self::sanitized)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path, &raw)
    }

    /// Loads `path`, logging and substituting defaults on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!("loaded config from {}", path.display());
                config
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                warn!("{err}; using defaults");
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        self.start_level = self.start_level.clamp(1, LEVEL_COUNT);
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.gamepad_deadzone = self.gamepad_deadzone.clamp(0.0, 0.95);
        if !(self.player_speed.is_finite() && self.player_speed > 0.0) {
            self.player_speed = DEFAULT_PLAYER_SPEED;
        }
        self
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn startup_config() -> GameConfig {
    GameConfig::load_or_default(Path::new(CONFIG_PATH))
}

#[cfg(target_arch = "wasm32")]
pub fn startup_config() -> GameConfig {
    GameConfig::default()
}
