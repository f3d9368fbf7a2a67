//! Ingest of a directory of finding aids.
//!
//! - [`IngestPipeline`]: per-file convert-then-upload state machine
//! - [`BatchDriver`]: sequential batches, one login each
//! - [`IngestCounters`]: run tallies

mod counters;
mod driver;
mod pipeline;
mod response;
mod types;

pub use counters::IngestCounters;
pub use driver::{list_ingest_files, BatchDriver, IngestError, RunContext};
pub use pipeline::IngestPipeline;
pub use response::{interpret_conversion, interpret_upload};
pub use types::{FileOutcome, FileRecord, IngestSummary, Phase, PhaseFailure, RequestOutcome};
