use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Backend URI is an http(s) URL
/// - Username, password and converter method are non-empty
/// - Batch size and concurrency are at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let backend = &config.backend;

    if !(backend.uri.starts_with("http://") || backend.uri.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "backend.uri must be an http(s) URL, got '{}'",
            backend.uri
        )));
    }

    if backend.username.is_empty() {
        return Err(ConfigError::ValidationError(
            "backend.username cannot be empty".to_string(),
        ));
    }

    if backend.password.is_empty() {
        return Err(ConfigError::ValidationError(
            "backend.password cannot be empty".to_string(),
        ));
    }

    if backend.converter_method.is_empty() {
        return Err(ConfigError::ValidationError(
            "backend.converter_method cannot be empty".to_string(),
        ));
    }

    if config.ingest.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "ingest.batch_size cannot be 0".to_string(),
        ));
    }

    if config.ingest.max_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "ingest.max_concurrency cannot be 0".to_string(),
        ));
    }

    Ok(())
}
