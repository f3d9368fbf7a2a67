use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use aspace_ingest_core::LoggingConfig;

/// Install the global subscriber.
///
/// Everything at `RUST_LOG` (default `info`) goes to the append-only ingest
/// log; only errors reach the console.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let ingest_log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.ingest_log)
        .with_context(|| format!("Failed to open ingest log {:?}", config.ingest_log))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(ingest_log))
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        );

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(LevelFilter::ERROR);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
