use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - PokeAPI timeout is not 0 and a language is set
/// - Sync stop thresholds are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.pokeapi.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "pokeapi.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.pokeapi.language.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "pokeapi.language cannot be empty".to_string(),
        ));
    }

    if config.sync.not_found_threshold == 0 {
        return Err(ConfigError::ValidationError(
            "sync.not_found_threshold cannot be 0".to_string(),
        ));
    }

    if config.sync.max_consecutive_failures == Some(0) {
        return Err(ConfigError::ValidationError(
            "sync.max_consecutive_failures cannot be 0 (omit it to disable)".to_string(),
        ));
    }

    Ok(())
}
