//! Remote services
//!
//! The store-and-record service (uploads), the store-and-retrieve service
//! (binary content) and the ledger transaction lookup, behind one async trait so
//! the workflows can run against any backend.

pub mod http;
pub mod response;

pub use http::HttpStorageService;
pub use response::{parse_transaction_id, FileInfo, UploadResponse};

use crate::error::ApiError;
use crate::types::TransactionId;
use async_trait::async_trait;

/// Multipart upload payload.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    pub file_name: &'a str,
    pub media_type: &'a str,
    pub bytes: &'a [u8],
    pub owner_name: &'a str,
    pub owner_public_key: &'a str,
    pub owner_private_key: &'a str,
}

/// Boundary to the storage backend consumed by the drive workflows.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Store content and record it on the ledger.
    async fn store_and_record(&self, request: UploadRequest<'_>) -> Result<UploadResponse, ApiError>;

    /// Fetch the stored bytes for a transaction.
    async fn store_and_retrieve(&self, id: &TransactionId) -> Result<Vec<u8>, ApiError>;

    /// Read the file metadata recorded by a transaction.
    async fn lookup_transaction(&self, id: &TransactionId) -> Result<FileInfo, ApiError>;
}
