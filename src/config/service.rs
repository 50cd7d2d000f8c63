//! Remote service endpoints.

use serde::{Deserialize, Serialize};

pub(crate) fn default_store_url() -> String {
    "https://resilientfilesbackend.onrender.com".to_string()
}

pub(crate) fn default_ledger_url() -> String {
    "https://crow.resilientdb.com".to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    30
}

/// Where uploads, content retrieval and ledger lookups are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the store-and-record / store-and-retrieve service.
    #[serde(default = "default_store_url")]
    pub store_url: String,

    /// Base URL of the ledger transaction lookup service.
    #[serde(default = "default_ledger_url")]
    pub ledger_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_url: default_store_url(),
            ledger_url: default_ledger_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    pub fn endpoint_url_is_valid(endpoint: &str) -> bool {
        let endpoint = endpoint.trim();
        let Some((scheme, rest)) = endpoint.split_once("://") else {
            return false;
        };
        if scheme != "http" && scheme != "https" {
            return false;
        }
        if rest.is_empty() || rest.chars().any(char::is_whitespace) {
            return false;
        }

        let authority = rest.split('/').next().unwrap_or_default();
        let host_port = authority.rsplit('@').next().unwrap_or(authority);
        let host = if host_port.starts_with('[') {
            let Some(end_bracket) = host_port.find(']') else {
                return false;
            };
            &host_port[1..end_bracket]
        } else {
            host_port.split(':').next().unwrap_or_default()
        };

        if host.is_empty() {
            return false;
        }

        host == "localhost" || host.contains('.') || host.parse::<std::net::IpAddr>().is_ok()
    }

    /// Validate endpoint URLs and the timeout.
    pub fn validate(&self) -> Result<(), String> {
        if !Self::endpoint_url_is_valid(&self.store_url) {
            return Err(format!("Invalid store service URL: {}", self.store_url));
        }
        if !Self::endpoint_url_is_valid(&self.ledger_url) {
            return Err(format!("Invalid ledger URL: {}", self.ledger_url));
        }
        if self.timeout_secs == 0 {
            return Err("Service timeout must be at least one second".to_string());
        }
        Ok(())
    }
}
