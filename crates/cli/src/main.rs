mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use sha2::{Digest, Sha256};
use tracing::{error, info};

use aspace_ingest_core::{
    create_authenticator, create_error_log, list_ingest_files, load_config, validate_config,
    BackendEndpoints, BatchDriver, Config, Dispatcher, ErrorLogSink, ExcludeSet,
    FileErrorLogSink, HttpTransport, IngestPipeline, RunContext, SanitizedConfig, Transport,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for the error-response log channel
const ERROR_LOG_BUFFER_SIZE: usize = 1000;

#[tokio::main]
async fn main() {
    // Determine config path
    let config_path = std::env::var("ASPACE_INGEST_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Logging is configured by the config file, so failures up to here can
    // only go to stderr.
    let config = match load_and_validate(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_and_validate(path: &Path) -> Result<Config> {
    let config =
        load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

async fn run(config: Config) -> Result<()> {
    info!("Start of Processing");

    let sanitized = SanitizedConfig::from(&config);
    let config_json = serde_json::to_string(&sanitized).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        backend = %config.backend.uri,
        ingest_dir = ?config.ingest.dir,
        "Configuration loaded"
    );

    let exclude = ExcludeSet::load(&config.ingest.exclude_list)
        .with_context(|| format!("Failed to read exclude list {:?}", config.ingest.exclude_list))?;

    // Error-response log writer
    let sink: Arc<dyn ErrorLogSink> = Arc::new(
        FileErrorLogSink::open(&config.logging.error_log).with_context(|| {
            format!("Failed to open error log {:?}", config.logging.error_log)
        })?,
    );
    let (error_log, error_log_writer) = create_error_log(sink, ERROR_LOG_BUFFER_SIZE);
    let writer_handle = tokio::spawn(error_log_writer.run());

    let transport: Arc<dyn Transport> =
        Arc::new(HttpTransport::new().context("Failed to create HTTP client")?);
    let authenticator = create_authenticator(Arc::clone(&transport), &config.backend);
    info!("Using authenticator: {}", authenticator.method_name());

    let context = RunContext::new();
    info!(run_id = %context.run_id, "BEGIN RUN");

    let pipeline = IngestPipeline::new(
        BackendEndpoints::new(&config.backend),
        Arc::new(exclude),
        Dispatcher::new(transport, config.ingest.max_concurrency),
        Arc::clone(&context.counters),
    )
    .with_error_log(
        error_log.clone(),
        config.logging.error_log.display().to_string(),
    );
    let driver = BatchDriver::new(authenticator, pipeline, config.ingest.batch_size);

    let result = match list_ingest_files(&config.ingest.dir) {
        Ok(files) => driver.run(files).await,
        Err(e) => Err(e),
    };

    // Drop every ErrorLogHandle so the writer's channel closes, then wait
    // for it to flush what is left.
    drop(driver);
    drop(error_log);
    finish_error_log(writer_handle, &config.logging.error_log).await;

    let summary = result.context("Ingest aborted")?;
    info!(run_id = %context.run_id, "Run finished: {}", summary);

    Ok(())
}

/// Wait for the error-log writer to flush its queue.
///
/// Returns false if the writer task died, in which case entries may be
/// missing from the error log.
async fn finish_error_log(writer: JoinHandle<()>, path: &Path) -> bool {
    match writer.await {
        Ok(()) => true,
        Err(e) => {
            error!("Error log writer failed, {:?} may be incomplete: {}", path, e);
            false
        }
    }
}
