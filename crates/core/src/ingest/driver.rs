//! Batch driver: splits the listing into batches and runs them one by one.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{AuthError, Authenticator};

use super::counters::IngestCounters;
use super::pipeline::IngestPipeline;
use super::types::{FileRecord, IngestSummary};

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Login failed; no further batch is attempted.
    #[error("Failed to acquire auth: {0}")]
    Auth(#[from] AuthError),

    #[error("Failed to list ingest directory {path}: {source}")]
    Listing {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Identity and tallies of one ingest run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub counters: Arc<IngestCounters>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            counters: Arc::new(IngestCounters::new()),
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// List `*.xml` regular files directly inside `dir`, sorted by path.
///
/// Hidden files are skipped, so AppleDouble companions such as `._a.xml`
/// are never sent to the converter.
pub fn list_ingest_files(dir: &Path) -> Result<Vec<FileRecord>, IngestError> {
    let listing_error = |source| IngestError::Listing {
        path: dir.display().to_string(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(listing_error)? {
        let entry = entry.map_err(listing_error)?;
        let path = entry.path();
        let is_xml = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".xml") && !n.starts_with('.'));
        if is_xml && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths.into_iter().map(FileRecord::new).collect())
}

/// Runs batches strictly in sequence.
///
/// Every batch starts with a fresh login, submits all of its files and drains
/// the dispatcher before the next batch begins.
pub struct BatchDriver {
    authenticator: Arc<dyn Authenticator>,
    pipeline: IngestPipeline,
    batch_size: usize,
}

impl BatchDriver {
    /// `batch_size` is clamped to at least 1.
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        pipeline: IngestPipeline,
        batch_size: usize,
    ) -> Self {
        Self {
            authenticator,
            pipeline,
            batch_size: batch_size.max(1),
        }
    }

    /// Ingest `files` and return the final counts.
    ///
    /// Stops at the first failed login; work of earlier batches is kept in
    /// the counters but no summary is produced.
    pub async fn run(&self, files: Vec<FileRecord>) -> Result<IngestSummary, IngestError> {
        let batches = files.len().div_ceil(self.batch_size);
        info!(
            files = files.len(),
            batches,
            batch_size = self.batch_size,
            "BEGIN INGEST"
        );

        for (index, batch) in files.chunks(self.batch_size).enumerate() {
            let session = self.authenticator.authorize().await?;

            for file in batch {
                self.pipeline.submit(file.clone(), &session).await;
            }
            self.pipeline.dispatcher().drain().await;

            let progress = self.pipeline.counters().snapshot();
            debug!(
                batch = index + 1,
                of = batches,
                files = batch.len(),
                total = progress.total,
                succeeded = progress.succeeded,
                excluded = progress.excluded,
                "Batch complete"
            );
        }

        let summary = self.pipeline.counters().snapshot();
        info!("{}", summary);
        info!("END INGEST");
        Ok(summary)
    }
}
