//! Vocabnotify configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main vocabnotify configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage locations
    pub storage: StorageConfig,

    /// Settings watcher behavior
    pub watcher: WatcherConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .vocabnotify.yml
        let local_config = PathBuf::from(".vocabnotify.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/vocabnotify/vocabnotify.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("vocabnotify").join("vocabnotify.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the word log and the settings record
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}

impl StorageConfig {
    /// The data directory as a path
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/vocabnotify on Linux)
        let data_dir = dirs::data_dir()
            .map(|d| d.join("vocabnotify"))
            .unwrap_or_else(|| PathBuf::from(".vocabnotify"))
            .to_string_lossy()
            .into_owned();

        Self { data_dir }
    }
}

/// Settings watcher behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Seconds between settings polls
    #[serde(rename = "poll-interval-secs")]
    pub poll_interval_secs: u64,
}

impl WatcherConfig {
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self { poll_interval_secs: 5 }
    }
}
