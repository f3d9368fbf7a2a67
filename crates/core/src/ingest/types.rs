//! Types for the ingest module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A finding aid selected for ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    path: PathBuf,
    basename: String,
}

impl FileRecord {
    /// Derives the basename by dropping the directory and a trailing `.xml`.
    pub fn new(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let basename = file_name
            .strip_suffix(".xml")
            .filter(|stem| !stem.is_empty())
            .unwrap_or(&file_name)
            .to_string();
        Self { path, basename }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Path as used in log lines.
    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }
}

/// The two request phases of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Conversion,
    Upload,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Conversion => "conversion",
            Phase::Upload => "upload",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one file in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    Skipped,
    ConvertFailed,
    UploadFailed,
    Succeeded,
}

/// Why a phase failed. File-scoped; never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseFailure {
    /// No HTTP response was obtained.
    #[error("request failed: {0}")]
    Transport(String),

    /// HTTP status other than 200.
    #[error("HTTP {status}")]
    Status { status: u16, body: String },

    /// HTTP 200 carrying an error signal from the backend.
    #[error("{0}")]
    Rejected(String),

    /// Body could not be interpreted.
    #[error("malformed response: {reason}")]
    Malformed { reason: String, body: String },

    /// Input file could not be read.
    #[error("could not read file: {0}")]
    Io(String),
}

/// Per-file result reported on the optional outcome channel.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub file: FileRecord,
    pub outcome: RequestOutcome,
    pub failure: Option<PhaseFailure>,
}

/// Totals for a run. `failed` is derived from the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IngestSummary {
    pub total: u64,
    pub excluded: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OK: {} EXCLUDED: {} FAIL: {} TOTAL: {}",
            self.succeeded, self.excluded, self.failed, self.total
        )
    }
}
