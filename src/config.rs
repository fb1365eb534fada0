//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\music-curator\config.toml
//! - macOS: ~/Library/Application Support/music-curator/config.toml
//! - Linux: ~/.config/music-curator/config.toml
//!
//! The config file is human-readable and editable. It carries the user
//! preferences the external layers would normally supply: download
//! quality, output directory, discography filtering flags, cover
//! embedding, and name patterns.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Download preferences
    pub download: DownloadConfig,

    /// Discography filtering preferences
    pub filter: FilterConfig,

    /// File and folder naming patterns
    pub naming: NamingConfig,
}

/// Download preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Quality tier requested from the catalog (5, 6, 7, 27)
    pub quality: u8,

    /// Root directory for finished downloads
    pub directory: PathBuf,

    /// Embed cover art into tagged files
    pub embed_art: bool,

    /// Skip playlist generation after sanitizing
    pub no_m3u: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            quality: 6,
            directory: PathBuf::from("Music"),
            embed_art: false,
            no_m3u: false,
        }
    }
}

/// Discography filtering preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Run the one-best-release-per-album filter on artist pages
    pub smart_discography: bool,

    /// Prefer the lowest sampling rate at the best bit depth
    pub save_space: bool,

    /// Drop deluxe/live/collector/anniversary editions
    pub skip_extras: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            smart_discography: false,
            save_space: false,
            skip_extras: false,
        }
    }
}

/// Name pattern settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Album folder pattern
    pub folder_format: String,

    /// Track filename pattern (without extension)
    pub track_format: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            folder_format: "{artist} - {title} ({year})".to_string(),
            track_format: crate::tags::DEFAULT_TRACK_FORMAT.to_string(),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("music-curator"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    let path = dir.join("config.toml");

    // Ensure directory exists
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::CreateDir(dir.clone(), e))?;

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| ConfigError::Rename(temp_path, path.clone(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
