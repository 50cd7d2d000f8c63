//! Core types for the drive client.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// TransactionId: ledger transaction identifying a stored file.
///
/// Construct through [`TransactionId::sanitize`] when the value comes from user
/// input; the service never issues identifiers outside `[A-Za-z0-9]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Keep only ASCII alphanumerics. Rejects input that has none.
    pub fn sanitize(raw: &str) -> Result<Self, ApiError> {
        let cleaned: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();
        if cleaned.is_empty() {
            return Err(ApiError::InvalidTransactionId(raw.to_string()));
        }
        Ok(Self(cleaned))
    }

    /// Wrap an identifier reported by the service without filtering it.
    pub fn from_service(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
