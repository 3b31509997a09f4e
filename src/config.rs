//! Viewer configuration.
//!
//! Only two things are tunable: the animation tick cadence of the render coordinator and
//! the placement applied to actors when they are staged. Values come from a TOML file
//! (explicit path, then `<config_dir>/stlvr/config.toml`) and fall back to defaults.

use crate::error::{Result, ViewerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Minimum spacing between two animation ticks.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Minimum elapsed time before queued rotations are applied again
    pub tick_interval_ms: u64,
    /// Upper bound on how long one event-service step may wait for input
    pub event_poll_ms: u64,
    /// Scene background colour used when the coordinator starts
    pub background: [u8; 3],
    pub placement: Placement,
}

/// Initial transform applied to an actor when it is staged.
///
/// The actor is first re-centred on its origin, rotated about X, then shifted by `offset`.
/// An actor's origin is the centre of its mesh bounds rather than the model-space zero, so
/// the part pivots about its own middle and lands with that middle at `offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub rotate_x: f64,
    pub offset: [f64; 3],
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            rotate_x: -90.0,
            offset: [0.0, -100.0, -200.0],
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            event_poll_ms: 2,
            background: [26, 51, 102],
            placement: Placement::default(),
        }
    }
}

impl ViewerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn event_poll(&self) -> Duration {
        Duration::from_millis(self.event_poll_ms)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ViewerError::config(e.to_string()))
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ViewerError::file_error(format!("Failed to read config: {}", path.display()), e)
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve configuration: explicit path, then the user config directory, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("loading config from {}", path.display());
                Self::load_from(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stlvr").join("config.toml"))
    }
}
