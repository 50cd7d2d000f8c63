//! Upload workflow: local file selection to a new unretrieved item.

use super::Drive;
use crate::error::{ApiError, StorageError};
use crate::mime;
use crate::service::UploadRequest;
use crate::store::Item;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;

/// A local file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
    pub modified: Option<DateTime<Utc>>,
}

impl FileSelection {
    /// Selection from in-memory bytes. An empty media type is guessed from the name.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mut media_type = media_type.into();
        if media_type.trim().is_empty() {
            media_type = mime::guess_for_filename(&name);
        }
        Self {
            size: bytes.len() as u64,
            name,
            media_type,
            bytes,
            modified: None,
        }
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Read a file from disk, taking its name and modification time.
    pub fn from_path(path: &Path) -> Result<Self, ApiError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ApiError::ConfigError(format!("Not a valid file name: {}", path.display()))
            })?
            .to_string();
        let bytes = std::fs::read(path).map_err(StorageError::IoError)?;
        let modified = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        let mut selection = Self::new(name, "", bytes);
        selection.modified = modified;
        Ok(selection)
    }
}

impl Drive {
    /// Send one file to the store-and-record service and append it as unretrieved.
    ///
    /// Nothing is committed when the service call fails.
    pub async fn upload(&self, selection: FileSelection) -> Result<Item, ApiError> {
        let owner_name = self.owner_name();
        let keys = self.keys().clone();

        let request = UploadRequest {
            file_name: &selection.name,
            media_type: &selection.media_type,
            bytes: &selection.bytes,
            owner_name: &owner_name,
            owner_public_key: &keys.public_key,
            owner_private_key: &keys.private_key,
        };

        let response = self.service.store_and_record(request).await.map_err(|e| {
            tracing::error!(file = %selection.name, error = %e, "Upload failed");
            e
        })?;
        let transaction_id = response.transaction_id()?;

        let (broad_type, sub_type) = mime::split_media_type(&selection.media_type);
        let date = selection
            .modified
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let item = Item {
            name: selection.name,
            broad_type,
            sub_type,
            date,
            owner: owner_name,
            transaction_id,
            owner_public_key: keys.public_key,
            is_retrieved: false,
            owner_private_key: Some(keys.private_key),
            content: None,
        };

        self.store.write().append(item.clone());
        tracing::info!(
            file = %item.name,
            transaction_id = %item.transaction_id,
            size = selection.size,
            "Uploaded file"
        );
        Ok(item)
    }

    /// Upload several files concurrently. Each result commits independently.
    pub async fn upload_all(&self, selections: Vec<FileSelection>) -> Vec<Result<Item, ApiError>> {
        futures::future::join_all(selections.into_iter().map(|s| self.upload(s))).await
    }
}
