//! Types for the dispatcher module.

use serde::{Deserialize, Serialize};

/// Snapshot of a dispatcher's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStatus {
    /// Requests waiting for a concurrency permit.
    pub queued: usize,
    /// Requests on the wire or running their completion handler.
    pub in_flight: usize,
    /// Maximum concurrent requests.
    pub max_concurrent: usize,
    /// Requests whose completion handler has returned.
    pub completed: u64,
    /// Requests that never produced an HTTP response.
    pub transport_failures: u64,
}
