//! Retrieval workflow: transaction id to reconciled or new retrieved item.

use super::Drive;
use crate::error::ApiError;
use crate::mime;
use crate::service::FileInfo;
use crate::store::{normalize_date, Blob, Item, TransactionMatch};
use crate::types::TransactionId;

/// What a successful retrieval did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// An uploaded record was completed in place.
    Reconciled { index: usize, item: Item },
    /// A new retrieved record was appended.
    Added { index: usize, item: Item },
}

impl RetrievalOutcome {
    pub fn item(&self) -> &Item {
        match self {
            RetrievalOutcome::Reconciled { item, .. } | RetrievalOutcome::Added { item, .. } => item,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            RetrievalOutcome::Reconciled { index, .. } | RetrievalOutcome::Added { index, .. } => {
                *index
            }
        }
    }

    pub fn is_reconciled(&self) -> bool {
        matches!(self, RetrievalOutcome::Reconciled { .. })
    }
}

/// Build a retrieved item from ledger metadata. No ownership marker is set.
fn item_from_ledger(id: &TransactionId, info: FileInfo, bytes: Vec<u8>) -> Item {
    let extension = if info.file_type.trim().is_empty() {
        mime::extension_of(&info.file_name)
            .unwrap_or("unknown")
            .to_string()
    } else {
        info.file_type.clone()
    };
    let media_type = mime::resolve_ledger_type(&extension);
    let (broad_type, sub_type) = mime::split_media_type(&media_type);
    let date = info
        .modification_time
        .as_deref()
        .map(normalize_date)
        .unwrap_or_default();

    Item {
        name: info.file_name,
        broad_type,
        sub_type,
        date,
        owner: info.owner_name,
        transaction_id: id.clone(),
        owner_public_key: info.owner_key,
        is_retrieved: true,
        owner_private_key: None,
        content: Some(Blob::new(media_type, bytes)),
    }
}

impl Drive {
    /// Retrieve the file recorded by `raw_id`.
    ///
    /// The id is reduced to ASCII alphanumerics first. An id that is already
    /// retrieved is refused before any network call, as is an id whose
    /// retrieval is still running.
    pub async fn retrieve(&self, raw_id: &str) -> Result<RetrievalOutcome, ApiError> {
        let id = TransactionId::sanitize(raw_id)?;

        let _claim = self
            .in_flight
            .try_claim(&id)
            .ok_or_else(|| ApiError::RetrievalInProgress(id.to_string()))?;
        tracing::debug!(transaction_id = %id, in_flight = self.in_flight.len(), "Retrieval started");

        let planned = self.store.read().find_by_transaction(&id);
        if let TransactionMatch::Retrieved(_) = planned {
            tracing::warn!(transaction_id = %id, "Refusing retrieval of already retrieved transaction");
            return Err(ApiError::AlreadyRetrieved(id.to_string()));
        }

        let bytes = self.service.store_and_retrieve(&id).await.map_err(|e| {
            tracing::error!(transaction_id = %id, error = %e, "Content fetch failed");
            e
        })?;

        let ledger = match planned {
            TransactionMatch::Absent => {
                let info = self.service.lookup_transaction(&id).await.map_err(|e| {
                    tracing::error!(transaction_id = %id, error = %e, "Ledger lookup failed");
                    e
                })?;
                Some(info)
            }
            _ => None,
        };

        let mut store = self.store.write();
        match store.find_by_transaction(&id) {
            TransactionMatch::Retrieved(_) => Err(ApiError::AlreadyRetrieved(id.to_string())),
            TransactionMatch::Unretrieved(index) => {
                store.update_in_place(index, |item| {
                    let media_type = item.media_type();
                    item.content = Some(Blob::new(media_type, bytes));
                    item.is_retrieved = true;
                });
                let item = store
                    .get(index)
                    .cloned()
                    .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
                tracing::info!(transaction_id = %id, index, "Reconciled uploaded item");
                Ok(RetrievalOutcome::Reconciled { index, item })
            }
            TransactionMatch::Absent => {
                // The store was replaced while the content was in flight and
                // no ledger metadata was fetched for a new record.
                let info = ledger.ok_or_else(|| ApiError::NotFound(id.to_string()))?;
                let item = item_from_ledger(&id, info, bytes);
                store.append(item.clone());
                let index = store.len() - 1;
                tracing::info!(transaction_id = %id, index, file = %item.name, "Added retrieved item");
                Ok(RetrievalOutcome::Added { index, item })
            }
        }
    }
}
