//! Application configuration management.
//!
//! Handles loading, saving, and managing application-wide settings: where
//! the persisted lists live, where encoded videos are written, and how the
//! external encoder is invoked.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::encoder::EncoderConfig;
use crate::error::{Error, Result};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory the key-value store keeps its files in.
    #[serde(default = "default_data_directory")]
    pub data_directory: PathBuf,
    /// Directory encoded videos are written to.
    #[serde(default = "default_media_directory")]
    pub media_directory: PathBuf,
    /// External encoder settings.
    #[serde(default)]
    pub encoder: EncoderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            media_directory: default_media_directory(),
            encoder: EncoderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, or create defaults if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        if !config_path.exists() {
            debug!("Config file not found, using defaults");
            let config = Self::default();
            if let Err(e) = config.save() {
                warn!("Failed to save default config: {}", e);
            }
            return Ok(config);
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            Error::Configuration(format!(
                "Failed to read config file {}: {e}",
                config_path.display()
            ))
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {e}")))?;

        info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self) -> Result<()> {
        let config_path = config_file_path();

        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Configuration(format!(
                    "Failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, content).map_err(|e| {
            Error::Configuration(format!(
                "Failed to write config file {}: {e}",
                config_path.display()
            ))
        })?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }
}

/// Get the default directory for the key-value store files.
#[must_use]
pub fn default_data_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidvault")
        .join("storage")
}

/// Get the default directory for encoded videos.
#[must_use]
pub fn default_media_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidvault")
        .join("media")
}

/// Get the path to the config file.
fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("vidvault")
        .join("config.json")
}

/// Validate that a directory is suitable for storing app data.
fn validate_storage_directory(path: &Path) -> Result<()> {
    if !path.is_absolute() {
        return Err(Error::Configuration(
            "Storage directory must be an absolute path".to_string(),
        ));
    }

    if path.exists() {
        if !path.is_dir() {
            return Err(Error::Configuration(format!(
                "Path exists but is not a directory: {}",
                path.display()
            )));
        }
    } else {
        fs::create_dir_all(path).map_err(|e| {
            Error::Configuration(format!("Cannot create directory {}: {e}", path.display()))
        })?;
    }

    Ok(())
}

/// Configuration manager that handles loading and caching config.
pub struct ConfigManager {
    config: AppConfig,
}

impl ConfigManager {
    /// Create a new config manager, loading config from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded.
    pub fn new() -> Result<Self> {
        let config = AppConfig::load()?;
        Ok(Self { config })
    }

    /// Create a manager around an already-built config (used by tests and
    /// embedders that supply their own directories).
    #[must_use]
    pub const fn with_config(config: AppConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current configuration.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the data directory.
    #[must_use]
    pub fn data_directory(&self) -> &Path {
        &self.config.data_directory
    }

    /// Get the media directory.
    #[must_use]
    pub fn media_directory(&self) -> &Path {
        &self.config.media_directory
    }

    /// Replace the configuration, validating and persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory is unusable or the config cannot be
    /// saved.
    pub fn update(&mut self, config: AppConfig) -> Result<()> {
        validate_storage_directory(&config.data_directory)?;
        validate_storage_directory(&config.media_directory)?;
        self.config = config;
        self.config.save()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Resolution;

    #[test]
    fn test_default_config_directories_are_app_scoped() {
        let config = AppConfig::default();
        assert!(config.data_directory.to_string_lossy().contains("vidvault"));
        assert!(config.media_directory.to_string_lossy().contains("vidvault"));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = AppConfig {
            data_directory: PathBuf::from("/data"),
            media_directory: PathBuf::from("/media"),
            encoder: EncoderConfig::default().with_preset("slow"),
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed: AppConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let parsed: AppConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(parsed.encoder.default_resolution, Resolution::P720);
        assert_eq!(parsed.encoder.crf, 23);
        assert_eq!(parsed.data_directory, default_data_directory());
    }

    #[test]
    fn test_validate_rejects_relative_paths() {
        assert!(validate_storage_directory(Path::new("relative/dir")).is_err());
    }

    #[test]
    fn test_validate_rejects_file_paths() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = dir.path().join("a-file");
        fs::write(&file, "x").expect("write");
        assert!(validate_storage_directory(&file).is_err());
    }

    #[test]
    fn test_validate_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("a").join("b");
        validate_storage_directory(&nested).expect("validate");
        assert!(nested.is_dir());
    }
}
