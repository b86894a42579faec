//! Player settings: frame rate, speed, loop mode
//!
//! Settings can come from a JSON file. Lookup priority:
//! 1. Explicit path (CLI `--config`)
//! 2. `SEQPLAY_CONFIG` environment variable
//! 3. Built-in defaults (30 fps, speed 1.0, no looping)
//!
//! Missing keys fall back to defaults, so `{"loop_mode": "palindrome"}` is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::player::LoopMode;

/// Environment variable naming a settings file
pub const CONFIG_ENV: &str = "SEQPLAY_CONFIG";

/// Playback settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub fps: f32,
    pub speed: f32,
    pub loop_mode: LoopMode,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            speed: 1.0,
            loop_mode: LoopMode::None,
        }
    }
}

impl PlayerConfig {
    /// Read settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve settings from CLI path, then `SEQPLAY_CONFIG`, then defaults
    pub fn from_env_and_cli(cli_path: Option<PathBuf>) -> Result<Self> {
        let path = cli_path.or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));
        match path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }
}
