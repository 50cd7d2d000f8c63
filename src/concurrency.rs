//! In-flight retrieval tracking
//!
//! Uploads and retrievals may overlap. Two retrievals of the same transaction
//! would both try to reconcile the same record, so a retrieval claims its
//! identifier for as long as it runs and a second claim is refused.

use crate::types::TransactionId;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Set of transaction identifiers with a retrieval currently running.
#[derive(Debug, Default)]
pub struct InFlightRetrievals {
    active: Arc<Mutex<HashSet<TransactionId>>>,
}

impl InFlightRetrievals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id`. Returns `None` when another retrieval already holds it.
    ///
    /// The claim is released when the returned guard is dropped.
    pub fn try_claim(&self, id: &TransactionId) -> Option<RetrievalClaim> {
        let mut active = self.active.lock();
        if !active.insert(id.clone()) {
            return None;
        }
        Some(RetrievalClaim {
            active: Arc::clone(&self.active),
            id: id.clone(),
        })
    }

    /// Number of retrievals currently running.
    pub fn len(&self) -> usize {
        self.active.lock().len()
    }
}

/// Held by a running retrieval; releases the identifier on drop.
#[derive(Debug)]
pub struct RetrievalClaim {
    active: Arc<Mutex<HashSet<TransactionId>>>,
    id: TransactionId,
}

impl Drop for RetrievalClaim {
    fn drop(&mut self) {
        self.active.lock().remove(&self.id);
    }
}
