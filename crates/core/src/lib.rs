pub mod auth;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error_log;
pub mod exclude;
pub mod ingest;
pub mod testing;

pub use auth::{create_authenticator, AuthError, Authenticator, PasswordAuthenticator, SessionToken};
pub use client::{
    BackendEndpoints, HttpTransport, RawResponse, RequestBody, RequestDescriptor, Transport,
    TransportError,
};
pub use config::{
    load_config, load_config_from_str, validate_config, BackendConfig, Config, ConfigError,
    IngestConfig, LoggingConfig, SanitizedConfig,
};
pub use dispatcher::{DispatchStatus, Dispatcher};
pub use error_log::{create_error_log, ErrorLogHandle, ErrorLogSink, FileErrorLogSink};
pub use exclude::ExcludeSet;
pub use ingest::{
    list_ingest_files, BatchDriver, FileOutcome, FileRecord, IngestCounters, IngestError,
    IngestPipeline, IngestSummary, RequestOutcome, RunContext,
};
