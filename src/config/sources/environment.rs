//! Environment variable source: DRIVE_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// Uses DRIVE__ prefix and __ as separator for nested keys,
/// e.g. `DRIVE__SERVICE__STORE_URL`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("DRIVE")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
