//! reqwest-backed implementation of [`StorageService`].

use super::{FileInfo, StorageService, UploadRequest, UploadResponse};
use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::types::TransactionId;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// HTTP client for the storage service and the ledger.
#[derive(Debug, Clone)]
pub struct HttpStorageService {
    client: Client,
    store_url: String,
    ledger_url: String,
}

impl HttpStorageService {
    pub fn new(config: &ServiceConfig) -> Result<Self, ApiError> {
        config.validate().map_err(ApiError::ConfigError)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            store_url: config.store_url.trim_end_matches('/').to_string(),
            ledger_url: config.ledger_url.trim_end_matches('/').to_string(),
        })
    }

    fn upload_url(&self) -> String {
        format!("{}/upload_and_store/", self.store_url)
    }

    fn retrieve_url(&self) -> String {
        format!("{}/retrieve_file/", self.store_url)
    }

    fn transaction_url(&self, id: &TransactionId) -> String {
        format!("{}/v1/transactions/{}", self.ledger_url, id)
    }

    /// Turn a non-success response into a typed error carrying its payload.
    async fn rejection(response: Response, id: Option<&TransactionId>) -> ApiError {
        let status = response.status();
        let payload = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => ApiError::NotFound(id.to_string()),
            _ => ApiError::ServiceRejected {
                status: status.as_u16(),
                payload,
            },
        }
    }
}

#[async_trait]
impl StorageService for HttpStorageService {
    async fn store_and_record(&self, request: UploadRequest<'_>) -> Result<UploadResponse, ApiError> {
        let part = Part::bytes(request.bytes.to_vec())
            .file_name(request.file_name.to_string())
            .mime_str(request.media_type)
            .map_err(|e| {
                tracing::warn!(media_type = request.media_type, error = %e, "Rejected media type");
                ApiError::InvalidMediaType(request.media_type.to_string())
            })?;
        let form = Form::new()
            .part("file", part)
            .text("owner_name", request.owner_name.to_string())
            .text("owner_public_key", request.owner_public_key.to_string())
            .text("owner_private_key", request.owner_private_key.to_string());

        tracing::debug!(file = request.file_name, size = request.bytes.len(), "Uploading file");
        let response = self.client.post(self.upload_url()).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response, None).await);
        }
        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("upload response: {}", e)))
    }

    async fn store_and_retrieve(&self, id: &TransactionId) -> Result<Vec<u8>, ApiError> {
        tracing::debug!(transaction_id = %id, "Fetching stored content");
        let response = self
            .client
            .post(self.retrieve_url())
            .query(&[("tx_id", id.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response, Some(id)).await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn lookup_transaction(&self, id: &TransactionId) -> Result<FileInfo, ApiError> {
        tracing::debug!(transaction_id = %id, "Looking up ledger transaction");
        let response = self.client.get(self.transaction_url(id)).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response, Some(id)).await);
        }
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("ledger transaction: {}", e)))?;
        FileInfo::from_transaction(id, &body)
    }
}
