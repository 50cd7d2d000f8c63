//! Response shapes returned by the store-and-record service and the ledger.

use crate::error::ApiError;
use crate::types::TransactionId;
use serde::{Deserialize, Serialize};

/// Body of a successful `upload_and_store` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Human-readable status, e.g. `"Asset created and committed with transaction ID: <id>"`.
    #[serde(default)]
    pub message: String,
    /// Dedicated identifier field, when the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Ledger transaction id under the service's legacy field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_metadata: Option<serde_json::Value>,
}

impl UploadResponse {
    /// Transaction identifier for the stored file.
    ///
    /// Structured fields are authoritative. The trailing token of `message` is
    /// only consulted when neither is present.
    pub fn transaction_id(&self) -> Result<TransactionId, ApiError> {
        let structured = self
            .transaction_id
            .as_deref()
            .or(self.file_hash.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty());
        if let Some(id) = structured {
            return Ok(TransactionId::from_service(id));
        }

        match parse_transaction_id(&self.message) {
            Some(id) => {
                tracing::warn!(
                    message = %self.message,
                    "Upload response has no structured transaction id, using trailing message token"
                );
                Ok(TransactionId::from_service(id))
            }
            None => Err(ApiError::InvalidResponse(format!(
                "upload response carries no transaction id: {:?}",
                self.message
            ))),
        }
    }
}

/// Trailing whitespace-delimited token of a status message.
pub fn parse_transaction_id(message: &str) -> Option<&str> {
    message.split_whitespace().last()
}

/// `asset.data.file_info` of a ledger transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    pub file_name: String,
    /// Extension token without the dot, `"unknown"` when the file had none.
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub owner_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_time: Option<String>,
}

impl FileInfo {
    /// Pull `asset.data.file_info` out of a raw ledger transaction.
    pub fn from_transaction(
        id: &TransactionId,
        transaction: &serde_json::Value,
    ) -> Result<Self, ApiError> {
        let file_info = transaction
            .pointer("/asset/data/file_info")
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        serde_json::from_value(file_info.clone()).map_err(|e| {
            ApiError::InvalidResponse(format!("ledger file_info for {}: {}", id, e))
        })
    }
}
