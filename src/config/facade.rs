//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::DriveConfig;
use crate::error::ApiError;
use std::path::{Path, PathBuf};

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Global config file path (`$XDG_CONFIG_HOME/drive/config.toml`).
    pub fn global_config_path() -> Result<PathBuf, ApiError> {
        Ok(super::xdg::config_home()?.join("drive").join("config.toml"))
    }

    /// Workspace config file path (`<workspace>/drive.toml`).
    pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
        workspace_root.join("drive.toml")
    }

    /// Load configuration from files and environment.
    pub fn load(workspace_root: &Path) -> Result<DriveConfig, ApiError> {
        Ok(MergeService::load(workspace_root)?)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<DriveConfig, ApiError> {
        Ok(MergeService::load_from_file(path)?)
    }

    /// Create default configuration.
    pub fn default() -> DriveConfig {
        DriveConfig::default()
    }

    /// Write `config` as TOML, creating parent directories.
    pub fn write(path: &Path, config: &DriveConfig) -> Result<(), ApiError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ApiError::ConfigError(format!(
                        "Failed to create config directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        let content = toml::to_string_pretty(config)
            .map_err(|e| ApiError::ConfigError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to write config to {}: {}",
                path.display(),
                e
            ))
        })
    }
}
