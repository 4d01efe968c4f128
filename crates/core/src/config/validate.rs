use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Event capacities are positive
/// - Tool paths are not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.events.capacity == 0 {
        return Err(ConfigError::ValidationError(
            "events.capacity must be greater than 0".to_string(),
        ));
    }
    if config.events.broadcast_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "events.broadcast_capacity must be greater than 0".to_string(),
        ));
    }

    for (name, value) in [
        ("tools.ffmpeg_path", &config.tools.ffmpeg_path),
        ("tools.whisper_path", &config.tools.whisper_path),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    Ok(())
}
