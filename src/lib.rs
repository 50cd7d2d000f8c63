//! Drive: a client for a ledger-backed file store
//!
//! Uploads local files to a store-and-record service, retrieves stored files by
//! transaction id, and keeps an in-memory list of known items that can be
//! searched, sorted, filtered and saved to a snapshot file.

mod concurrency;
pub mod config;
pub mod drive;
pub mod error;
pub mod format;
pub mod keys;
pub mod logging;
pub mod mime;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod tooling;
pub mod types;
pub mod views;

pub use drive::{Drive, FileSelection, RetrievalOutcome};
pub use error::{ApiError, StorageError};
pub use store::{Blob, Item, ItemStore};
pub use types::TransactionId;
pub use views::{SortMode, ViewQuery};
