use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub ingest: IngestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// ArchivesSpace backend connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend base URI (e.g., "http://localhost:8089")
    pub uri: String,
    #[serde(default = "default_username")]
    pub username: String,
    pub password: String,
    /// Repository that converted resources are imported into
    #[serde(default = "default_repository_id")]
    pub repository_id: u32,
    /// Converter used by `jsonmodel_from_format` (default: "ead")
    #[serde(default = "default_converter_method")]
    pub converter_method: String,
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_repository_id() -> u32 {
    2
}

fn default_converter_method() -> String {
    "ead".to_string()
}

/// Ingest job settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Directory scanned for `*.xml` finding aids
    pub dir: PathBuf,
    /// Files per batch; the session is re-acquired before every batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Maximum number of requests on the wire at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Optional list of basenames to skip
    #[serde(default = "default_exclude_list")]
    pub exclude_list: PathBuf,
}

fn default_batch_size() -> usize {
    20
}

fn default_max_concurrency() -> usize {
    4
}

fn default_exclude_list() -> PathBuf {
    PathBuf::from("exclude_list.txt")
}

/// Log file locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_ingest_log")]
    pub ingest_log: PathBuf,
    #[serde(default = "default_error_log")]
    pub error_log: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            ingest_log: default_ingest_log(),
            error_log: default_error_log(),
        }
    }
}

fn default_ingest_log() -> PathBuf {
    PathBuf::from("ingestlog.log")
}

fn default_error_log() -> PathBuf {
    PathBuf::from("error_responses")
}

/// Sanitized config for logging (password redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub backend: SanitizedBackendConfig,
    pub ingest: IngestConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBackendConfig {
    pub uri: String,
    pub username: String,
    pub password_configured: bool,
    pub repository_id: u32,
    pub converter_method: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            backend: SanitizedBackendConfig {
                uri: config.backend.uri.clone(),
                username: config.backend.username.clone(),
                password_configured: !config.backend.password.is_empty(),
                repository_id: config.backend.repository_id,
                converter_method: config.backend.converter_method.clone(),
            },
            ingest: config.ingest.clone(),
            logging: config.logging.clone(),
        }
    }
}
