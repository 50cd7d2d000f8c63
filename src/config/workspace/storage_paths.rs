//! StorageConfig and path resolution for the snapshot and downloads.

use crate::config::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Local storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot carrying the item list between CLI runs. Relative paths are
    /// resolved against the workspace root; unset uses the XDG data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,

    /// Directory retrieved files are saved to. Defaults to the workspace root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads_dir: Option<PathBuf>,
}

/// Storage paths after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStorage {
    pub snapshot_path: PathBuf,
    pub downloads_dir: PathBuf,
}

impl StorageConfig {
    /// Resolve storage paths to actual filesystem locations.
    pub fn resolve_paths(&self, workspace_root: &Path) -> Result<ResolvedStorage, ApiError> {
        let snapshot_path = match &self.snapshot_path {
            Some(path) => workspace_root.join(path),
            None => xdg::workspace_data_dir(workspace_root)?.join("snapshot.json"),
        };

        let downloads_dir = match &self.downloads_dir {
            Some(path) => workspace_root.join(path),
            None => workspace_root.to_path_buf(),
        };

        Ok(ResolvedStorage {
            snapshot_path,
            downloads_dir,
        })
    }
}
