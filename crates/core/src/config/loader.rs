use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `TRANSCRIBER_SERVER__PORT=9000`.
pub const CONFIG_ENV_PREFIX: &str = "TRANSCRIBER_";

/// Load configuration from file with environment variable overrides.
///
/// A missing file is not an error; every section has defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
    }

    let config: Config = figment
        .merge(Env::prefixed(CONFIG_ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
