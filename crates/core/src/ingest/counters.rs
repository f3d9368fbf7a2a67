use std::sync::atomic::{AtomicU64, Ordering};

use super::types::IngestSummary;

/// Outcome tallies for one run.
///
/// Each counter is an independent atomic since increments come from
/// unordered completion handlers. `total` is bumped once per file on entry;
/// `excluded` and `succeeded` at most once per file and never both.
#[derive(Debug, Default)]
pub struct IngestCounters {
    total: AtomicU64,
    excluded: AtomicU64,
    succeeded: AtomicU64,
}

impl IngestCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_entry(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_excluded(&self) {
        self.excluded.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> IngestSummary {
        // Read success and exclusion first so failed can never go negative
        // while handlers are still running.
        let succeeded = self.succeeded.load(Ordering::SeqCst);
        let excluded = self.excluded.load(Ordering::SeqCst);
        let total = self.total.load(Ordering::SeqCst);
        IngestSummary {
            total,
            excluded,
            succeeded,
            failed: total.saturating_sub(excluded + succeeded),
        }
    }
}
