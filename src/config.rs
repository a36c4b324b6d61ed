//! Configuration management
//!
//! Provides persistent settings storage with schema versioning.
//! Configuration is stored in `~/.souschef/config.json` and is shared
//! between the session core and the embedding UI.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Current config schema version
const CURRENT_VERSION: u32 = 1;

/// Global config instance for caching
static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version for migrations
    pub version: u32,
    /// Spoken feedback settings
    pub speech: SpeechConfig,
    /// Speech recognition settings
    pub recognition: RecognitionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            speech: SpeechConfig::default(),
            recognition: RecognitionConfig::default(),
        }
    }
}

/// Spoken feedback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Whether sessions start with spoken feedback enabled
    pub enabled: bool,
    /// Speaking rate (1.0 is natural; slightly slower reads clearer
    /// over kitchen noise)
    pub rate: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: crate::speech::SPEECH_RATE,
        }
    }
}

/// Speech recognition configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Recognition language tag (e.g. "en-US")
    pub language: String,
    /// Whether an engine-initiated end restarts recognition while the
    /// session is still listening
    pub auto_restart: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            auto_restart: true,
        }
    }
}

/// Returns the path to the souschef directory (~/.souschef).
fn souschef_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".souschef")
}

/// Returns the path to the config file (~/.souschef/config.json).
pub fn config_path() -> PathBuf {
    souschef_directory().join("config.json")
}

/// Loads configuration from the given path.
///
/// A missing file yields defaults; a malformed file is an error so the
/// caller can decide whether to fall back or surface it.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Saves configuration to the given path, creating parent directories.
pub fn save_config_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;

    tracing::debug!("Config saved to {:?}", path);
    Ok(())
}

/// Get the global config instance, loading from disk if needed
fn config_cell() -> &'static RwLock<Config> {
    CONFIG.get_or_init(|| {
        let config = match load_config_from(&config_path()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Config::default()
            }
        };
        RwLock::new(config)
    })
}

/// Returns the cached configuration, loading it on first access.
pub fn get_config() -> Config {
    config_cell().read().clone()
}

/// Replaces the configuration and persists it.
pub fn set_config(config: Config) -> Result<(), ConfigError> {
    save_config_to(&config, &config_path())?;
    *config_cell().write() = config;
    tracing::info!("Config updated");
    Ok(())
}

/// Resets the configuration to defaults and persists it.
pub fn reset_config() -> Result<Config, ConfigError> {
    let config = Config::default();
    set_config(config.clone())?;
    Ok(config)
}
