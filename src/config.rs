//! User configuration and preferences

use crate::error::{CullError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions scanned when the user has not configured any
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "fits", "fit", "fts", "xisf", "tif", "tiff", "png", "jpg", "jpeg",
];

/// Default index into the playback speed table (0.5 s)
pub const DEFAULT_PLAYBACK_SPEED: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Destination for files committed as Keep
    pub keep_directory: Option<PathBuf>,
    /// Destination for files committed as Reject
    pub reject_directory: Option<PathBuf>,
    /// Skip the yes/no gate before deleting ("don't ask again")
    pub suppress_delete_confirmation: bool,
    /// File extensions picked up by a directory scan
    pub extensions: Vec<String>,
    /// Whether scans descend into subdirectories
    pub recursive: bool,
    /// Index into the playback speed table
    pub playback_speed: usize,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            keep_directory: None,
            reject_directory: None,
            suppress_delete_confirmation: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            recursive: false,
            playback_speed: DEFAULT_PLAYBACK_SPEED,
        }
    }
}

impl UserConfig {
    /// Get the config file path (~/.config/blinkcull/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("blinkcull").join("config.json"))
    }

    /// Load config from the default location, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok_or_else(|| {
            CullError::ConfigError("Could not determine config directory".to_string())
        })?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            CullError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            CullError::ConfigError(format!("Failed to parse config file: {}", e))
        })
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            CullError::ConfigError("Could not determine config directory".to_string())
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CullError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            CullError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, contents).map_err(|e| {
            CullError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }
}

/// Configuration owned by the controller together with where it is persisted.
///
/// A `None` path keeps the settings in memory only.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub config: UserConfig,
    pub path: Option<PathBuf>,
}

impl Settings {
    pub fn new(config: UserConfig, path: Option<PathBuf>) -> Self {
        Self { config, path }
    }

    pub fn in_memory(config: UserConfig) -> Self {
        Self { config, path: None }
    }

    /// Writes the current config; failures are logged, never propagated
    pub fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        match self.config.save_to(path) {
            Ok(()) => tracing::info!(path = %path.display(), "settings saved"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to save settings"),
        }
    }
}
