//! Configuration
//!
//! Layered configuration for the drive client: built-in defaults, the global
//! config file, the workspace `drive.toml` and `DRIVE__*` environment variables.

mod facade;
mod merge;
pub mod paths;
pub mod service;
mod sources;
pub mod workspace;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use service::ServiceConfig;
pub use workspace::storage_paths::{ResolvedStorage, StorageConfig};

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

pub(crate) fn default_owner_name() -> String {
    "Anonymous".to_string()
}

/// Persisted session key pair. Both halves must be set to be used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

/// Root configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Display name sent with uploads.
    #[serde(default = "default_owner_name")]
    pub owner_name: String,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub keys: KeysConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            owner_name: default_owner_name(),
            service: ServiceConfig::default(),
            keys: KeysConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DriveConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.owner_name.trim().is_empty() {
            return Err("Owner name cannot be empty".to_string());
        }
        self.service.validate()
    }
}
