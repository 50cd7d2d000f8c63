//! Error types shared by the store, the service clients and the CLI.

use thiserror::Error;

/// Errors raised while reading or writing local files and snapshots.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

/// Top-level error surfaced to the user by every drive operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status and an error payload.
    #[error("Service rejected request ({status}): {payload}")]
    ServiceRejected { status: u16, payload: String },

    #[error("Transaction not found: {0}")]
    NotFound(String),

    #[error("Invalid transaction identifier: {0:?}")]
    InvalidTransactionId(String),

    #[error("Transaction {0} has already been retrieved")]
    AlreadyRetrieved(String),

    #[error("Retrieval of transaction {0} is already in progress")]
    RetrievalInProgress(String),

    #[error("Transaction {0} has not been retrieved yet")]
    NotRetrieved(String),

    #[error("Unexpected service response: {0}")]
    InvalidResponse(String),

    /// A file's media type cannot be sent as a multipart content type.
    #[error("Invalid media type {0:?}")]
    InvalidMediaType(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::StorageError(StorageError::IoError(err))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
