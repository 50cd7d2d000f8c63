//! Session key pairs.
//!
//! Keys are handed to the store-and-record service with each upload and kept on
//! items as opaque strings. Nothing in this crate signs or verifies with them.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

/// Hex-encoded Ed25519 key pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

impl KeyPair {
    /// Generate a fresh pair from the operating system RNG.
    pub fn generate() -> Self {
        let signing = SigningKey::generate(&mut OsRng);
        Self {
            public_key: hex::encode(signing.verifying_key().to_bytes()),
            private_key: hex::encode(signing.to_bytes()),
        }
    }

    /// Use persisted keys when both halves are configured, otherwise generate.
    pub fn from_config_or_generate(public_key: Option<&str>, private_key: Option<&str>) -> Self {
        match (public_key, private_key) {
            (Some(public), Some(private)) if !public.is_empty() && !private.is_empty() => Self {
                public_key: public.to_string(),
                private_key: private.to_string(),
            },
            _ => {
                tracing::debug!("No persisted key pair configured, generating session keys");
                Self::generate()
            }
        }
    }
}
