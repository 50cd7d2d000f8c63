//! Built-in defaults that every config source is layered over.

use crate::config::service::{default_ledger_url, default_store_url, default_timeout_secs};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Start a builder seeded with the defaults for every required key.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("owner_name", crate::config::default_owner_name())?
        .set_default("service.store_url", default_store_url())?
        .set_default("service.ledger_url", default_ledger_url())?
        .set_default("service.timeout_secs", default_timeout_secs())
}
