use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - An api key is present when caller auth uses one
/// - Repository URL and principal user id are set
/// - Index collection is a plain SQL identifier
/// - Ingestion limits are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_deref().unwrap_or("").trim().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method = \"api_key\"".to_string(),
        ));
    }

    if config.repository.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "repository.url cannot be empty".to_string(),
        ));
    }

    if config.principal.user_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "principal.user_id cannot be empty".to_string(),
        ));
    }

    if !is_identifier(&config.index.collection) {
        return Err(ConfigError::ValidationError(format!(
            "index.collection must match [A-Za-z_][A-Za-z0-9_]*, got '{}'",
            config.index.collection
        )));
    }

    let ingestion = &config.ingestion;
    if ingestion.max_file_size_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "ingestion.max_file_size_bytes cannot be 0".to_string(),
        ));
    }
    if ingestion.max_batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "ingestion.max_batch_size cannot be 0".to_string(),
        ));
    }
    if ingestion.batch_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "ingestion.batch_concurrency cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// Table names are interpolated into SQL, so only plain identifiers are allowed.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
