//! Drive session
//!
//! Owns the item store, the owner's display name, the session key pair and
//! the remote service handle. Upload and retrieval workflows mutate the store
//! through here; each completed step is one write-locked update, so overlapping
//! workflows never observe a half-applied change.

mod retrieval;
mod upload;

pub use retrieval::RetrievalOutcome;
pub use upload::FileSelection;

use crate::concurrency::InFlightRetrievals;
use crate::error::{ApiError, StorageError};
use crate::keys::KeyPair;
use crate::service::StorageService;
use crate::snapshot::{self, Snapshot};
use crate::store::{Item, ItemStore, TransactionMatch};
use crate::types::TransactionId;
use crate::views::{self, ViewQuery};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct Drive {
    store: RwLock<ItemStore>,
    keys: KeyPair,
    service: Arc<dyn StorageService>,
    in_flight: InFlightRetrievals,
}

impl Drive {
    pub fn new(owner_name: impl Into<String>, keys: KeyPair, service: Arc<dyn StorageService>) -> Self {
        Self {
            store: RwLock::new(ItemStore::new(owner_name)),
            keys,
            service,
            in_flight: InFlightRetrievals::new(),
        }
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    pub fn owner_name(&self) -> String {
        self.store.read().owner_name().to_string()
    }

    pub fn set_owner_name(&self, owner_name: impl Into<String>) {
        self.store.write().set_owner_name(owner_name);
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// Copy of every item in store order.
    pub fn items(&self) -> Vec<Item> {
        self.store.read().items().to_vec()
    }

    /// Copy of the projected listing.
    pub fn view(&self, query: &ViewQuery) -> Vec<Item> {
        let store = self.store.read();
        views::project(store.items(), query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Record for a (sanitized) transaction id, preferring a retrieved one.
    pub fn find(&self, raw_id: &str) -> Result<Option<Item>, ApiError> {
        let id = TransactionId::sanitize(raw_id)?;
        let store = self.store.read();
        let found = match store.find_by_transaction(&id) {
            TransactionMatch::Retrieved(index) | TransactionMatch::Unretrieved(index) => {
                store.get(index).cloned()
            }
            TransactionMatch::Absent => None,
        };
        Ok(found)
    }

    /// Write a retrieved item's content into `dir`, named after the item.
    pub fn download(&self, raw_id: &str, dir: &Path) -> Result<PathBuf, ApiError> {
        let id = TransactionId::sanitize(raw_id)?;
        let (name, bytes) = {
            let store = self.store.read();
            match store.find_by_transaction(&id) {
                TransactionMatch::Retrieved(index) => {
                    let item = store
                        .get(index)
                        .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
                    let content = item
                        .content
                        .as_ref()
                        .ok_or_else(|| ApiError::NotRetrieved(id.to_string()))?;
                    (item.name.clone(), content.bytes.clone())
                }
                TransactionMatch::Unretrieved(_) => {
                    return Err(ApiError::NotRetrieved(id.to_string()))
                }
                TransactionMatch::Absent => return Err(ApiError::NotFound(id.to_string())),
            }
        };

        // Only the final component of the stored name is used.
        let file_name = Path::new(&name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| id.as_str().into());
        std::fs::create_dir_all(dir).map_err(StorageError::IoError)?;
        let target = dir.join(file_name);
        std::fs::write(&target, bytes).map_err(StorageError::IoError)?;
        tracing::info!(transaction_id = %id, path = %target.display(), "Saved retrieved file");
        Ok(target)
    }

    pub fn export_snapshot(&self, path: &Path) -> Result<Snapshot, ApiError> {
        let store = self.store.read();
        snapshot::export_to_file(&store, path)
    }

    /// Replace the whole store with the snapshot at `path`.
    pub fn import_snapshot(&self, path: &Path) -> Result<usize, ApiError> {
        let mut store = self.store.write();
        snapshot::import_into(&mut store, path)
    }
}
