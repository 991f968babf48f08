//! Settings file loader.
//!
//! Reads `~/.config/kgi/timeline.ron` (or a path given on the command line).
//! A missing file means defaults; a broken one means defaults plus a warning.
//!
//! Example timeline.ron:
//! ```ron
//! (
//!     timeline: (
//!         tick_interval_ms: 1000,
//!         geometry: (max_blocks_per_height_group: 12, label_mode: daa_score),
//!     ),
//!     simulation: (heights_per_second: 2.0, max_blocks_per_height: 5),
//! )
//! ```

use std::path::{Path, PathBuf};

use kgi_client::TimelineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::simulated::SimulationConfig;

/// Everything the settings file can hold.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timeline: TimelineConfig,
    pub simulation: SimulationConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Default settings path (`~/.config/kgi/timeline.ron`).
pub fn settings_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("kgi").join("timeline.ron"))
}

/// Load settings from `explicit`, or the default path when `None`.
pub fn load_settings(explicit: Option<&Path>) -> Settings {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match settings_file_path() {
            Some(path) => path,
            None => {
                info!("No config directory available, using default settings");
                return Settings::default();
            }
        },
    };

    if !path.exists() {
        info!("Settings file not found at {:?}, using defaults", path);
        return Settings::default();
    }

    match load_settings_from_file(&path) {
        Ok(settings) => {
            info!("Loaded settings from {:?}", path);
            settings
        }
        Err(e) => {
            warn!("Failed to load settings from {:?}: {}", path, e);
            warn!("Falling back to default settings");
            Settings::default()
        }
    }
}

pub fn load_settings_from_file(path: &Path) -> Result<Settings, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(ron::from_str(&text)?)
}
