//! Item Store
//!
//! Ordered, in-memory list of items for the active session. The single source
//! of truth that the workflows mutate and the view projection reads.

pub mod item;

pub use item::{normalize_date, parse_date, Blob, Item, FOLDER_TYPE};

use crate::types::TransactionId;

/// Result of scanning the store for a transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMatch {
    /// No record carries the identifier.
    Absent,
    /// An uploaded record whose content has not been fetched, at this index.
    Unretrieved(usize),
    /// A record whose content is already held, at this index.
    Retrieved(usize),
}

/// Ordered item list plus the session owner's display name.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Vec<Item>,
    owner_name: String,
}

impl ItemStore {
    pub fn new(owner_name: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            owner_name: owner_name.into(),
        }
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn set_owner_name(&mut self, owner_name: impl Into<String>) {
        self.owner_name = owner_name.into();
    }

    /// Add to the end. No deduplication.
    pub fn append(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Wholesale replacement, used when loading a snapshot.
    pub fn replace_all(&mut self, items: Vec<Item>, owner_name: impl Into<String>) {
        self.items = items;
        self.owner_name = owner_name.into();
    }

    /// Mutate the record at `index` without moving it.
    ///
    /// Returns `false` when the index is out of range.
    pub fn update_in_place<F>(&mut self, index: usize, mutator: F) -> bool
    where
        F: FnOnce(&mut Item),
    {
        match self.items.get_mut(index) {
            Some(item) => {
                mutator(item);
                true
            }
            None => false,
        }
    }

    /// Classify the store's knowledge of `id`.
    ///
    /// A retrieved record wins over unretrieved duplicates; otherwise the first
    /// unretrieved record is the reconciliation target.
    pub fn find_by_transaction(&self, id: &TransactionId) -> TransactionMatch {
        let mut unretrieved = None;
        for (index, item) in self.items.iter().enumerate() {
            if &item.transaction_id != id {
                continue;
            }
            if item.is_retrieved {
                return TransactionMatch::Retrieved(index);
            }
            if unretrieved.is_none() {
                unretrieved = Some(index);
            }
        }
        match unretrieved {
            Some(index) => TransactionMatch::Unretrieved(index),
            None => TransactionMatch::Absent,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
