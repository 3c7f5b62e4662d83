//! The `config` module loads the settings used to open the store and run
//! maintenance sweeps.
//!
//! Sources, later ones winning:
//! 1. built-in defaults (`Settings::default()`)
//! 2. an optional config file (`config/default.toml` unless overridden)
//! 3. environment variables such as `POPSTORE__STORE__PATH`

mod settings;

use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, LogSettings, PartialSettings, Settings, StoreSettings};

/// Default config file, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Loads settings from the default file and environment variables.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(DEFAULT_CONFIG_FILE)
}

/// Loads settings from `file` (extension optional, file optional) and the
/// environment, merged over defaults.
pub fn load_config_from(file: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix("POPSTORE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}

#[cfg(test)]
mod tests;
