use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
///
/// Overrides use the `ASPACE_INGEST_` prefix with `__` between sections,
/// e.g. `ASPACE_INGEST_BACKEND__PASSWORD`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("ASPACE_INGEST_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[backend]
uri = "http://localhost:8089"
password = "admin"

[ingest]
dir = "/data/eads"
batch_size = 10
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.ingest.batch_size, 10);
    }

    #[test]
    fn test_load_config_from_str_missing_ingest() {
        let toml = r#"
[backend]
uri = "http://localhost:8089"
password = "admin"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[backend]
uri = "http://127.0.0.1:8089"
username = "ingest"
password = "secret"

[ingest]
dir = "/srv/eads"
max_concurrency = 8
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.backend.username, "ingest");
        assert_eq!(config.ingest.max_concurrency, 8);
        assert_eq!(config.ingest.dir.to_str().unwrap(), "/srv/eads");
    }
}
