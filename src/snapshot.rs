//! Session snapshots
//!
//! A flat JSON document holding the owner name and every item's metadata,
//! tagged with its creation time. Binary content is never written. The file's
//! modification time is set to the embedded timestamp on export and must still
//! match it on import.

use crate::error::{ApiError, StorageError};
use crate::store::{Item, ItemStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Serialized form of an [`ItemStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at: i64,
    pub owner_name: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Snapshot {
    /// Capture the store's metadata at `created_at`.
    pub fn capture(store: &ItemStore, created_at: i64) -> Self {
        let items = store
            .iter()
            .map(|item| Item {
                content: None,
                ..item.clone()
            })
            .collect();
        Self {
            created_at,
            owner_name: store.owner_name().to_string(),
            items,
        }
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot document. The top level must be a JSON object.
    pub fn from_json(text: &str) -> Result<Self, StorageError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| StorageError::MalformedSnapshot(format!("not valid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(StorageError::MalformedSnapshot(
                "snapshot content is not an object".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| StorageError::MalformedSnapshot(format!("unexpected layout: {}", e)))
    }

    /// Require the file's reported modification time to equal `created_at`.
    pub fn verify_modified(&self, modified_millis: i64) -> Result<(), StorageError> {
        if modified_millis != self.created_at {
            return Err(StorageError::MalformedSnapshot(format!(
                "file modification time {} does not match snapshot timestamp {}",
                modified_millis, self.created_at
            )));
        }
        Ok(())
    }

    /// Items as restored into a live store: no content, `is_retrieved` cleared.
    pub fn restored_items(self) -> (Vec<Item>, String) {
        let items = self
            .items
            .into_iter()
            .map(|item| Item {
                is_retrieved: false,
                content: None,
                ..item
            })
            .collect();
        (items, self.owner_name)
    }
}

fn system_time_millis(time: SystemTime) -> Result<i64, StorageError> {
    let since_epoch = time.duration_since(UNIX_EPOCH).map_err(|e| {
        StorageError::MalformedSnapshot(format!("modification time before epoch: {}", e))
    })?;
    i64::try_from(since_epoch.as_millis())
        .map_err(|_| StorageError::MalformedSnapshot("modification time out of range".to_string()))
}

/// Set the file's modification time and return the value it reports back.
fn stamp_modified(path: &Path, millis: i64) -> Result<i64, StorageError> {
    let millis_u64 = u64::try_from(millis).map_err(|_| {
        StorageError::MalformedSnapshot("snapshot timestamp before epoch".to_string())
    })?;
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_modified(UNIX_EPOCH + Duration::from_millis(millis_u64))?;
    drop(file);
    system_time_millis(std::fs::metadata(path)?.modified()?)
}

fn write_snapshot<F>(path: &Path, snapshot: &Snapshot, stamp: &F) -> Result<i64, StorageError>
where
    F: Fn(&Path, i64) -> Result<i64, StorageError>,
{
    std::fs::write(path, snapshot.to_json()?)?;
    stamp(path, snapshot.created_at)
}

/// Export with a custom stamping step.
///
/// Filesystems with coarse timestamps keep less than millisecond precision;
/// the snapshot then adopts the time the file actually reports and is
/// rewritten once so the two agree.
fn export_with<F>(store: &ItemStore, path: &Path, created_at: i64, stamp: F) -> Result<Snapshot, ApiError>
where
    F: Fn(&Path, i64) -> Result<i64, StorageError>,
{
    let mut snapshot = Snapshot::capture(store, created_at);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(StorageError::IoError)?;
        }
    }
    let stored = write_snapshot(path, &snapshot, &stamp)?;
    if stored != snapshot.created_at {
        tracing::debug!(
            path = %path.display(),
            requested = snapshot.created_at,
            stored,
            "Filesystem coarsened snapshot timestamp"
        );
        snapshot.created_at = stored;
        let restamped = write_snapshot(path, &snapshot, &stamp)?;
        if restamped != stored {
            return Err(StorageError::MalformedSnapshot(format!(
                "filesystem did not keep modification time {} (reported {})",
                stored, restamped
            ))
            .into());
        }
    }

    tracing::info!(
        path = %path.display(),
        items = snapshot.items.len(),
        created_at = snapshot.created_at,
        "Exported snapshot"
    );
    Ok(snapshot)
}

/// Write `store` to `path` and stamp the file with the snapshot timestamp.
pub fn export_to_file(store: &ItemStore, path: &Path) -> Result<Snapshot, ApiError> {
    export_with(store, path, Utc::now().timestamp_millis(), stamp_modified)
}

/// Read and validate a snapshot file.
pub fn read_from_file(path: &Path) -> Result<Snapshot, ApiError> {
    let modified = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(StorageError::IoError)?;
    let text = std::fs::read_to_string(path).map_err(StorageError::IoError)?;

    let snapshot = Snapshot::from_json(&text)?;
    snapshot.verify_modified(system_time_millis(modified)?)?;
    Ok(snapshot)
}

/// Replace the store's contents with the snapshot at `path`.
pub fn import_into(store: &mut ItemStore, path: &Path) -> Result<usize, ApiError> {
    let snapshot = read_from_file(path)?;
    let (items, owner_name) = snapshot.restored_items();
    let count = items.len();
    store.replace_all(items, owner_name);
    tracing::info!(path = %path.display(), items = count, "Imported snapshot");
    Ok(count)
}
