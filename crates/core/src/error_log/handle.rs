use chrono::Utc;
use tokio::sync::mpsc;

use super::{ErrorLogEnvelope, ErrorLogEvent};

/// Handle for emitting error-response log entries
///
/// This is cheaply cloneable and can be shared across completion handlers.
/// Entries are sent through an async channel to be written by the ErrorLogWriter.
#[derive(Clone)]
pub struct ErrorLogHandle {
    tx: mpsc::Sender<ErrorLogEnvelope>,
}

impl ErrorLogHandle {
    /// Create a new handle from a channel sender
    pub fn new(tx: mpsc::Sender<ErrorLogEnvelope>) -> Self {
        Self { tx }
    }

    /// A handle whose entries go nowhere (the receiver is dropped at once).
    pub fn disabled() -> Self {
        let (tx, _rx) = mpsc::channel(1);
        Self { tx }
    }

    /// Emit an entry asynchronously
    ///
    /// If the channel is closed, the error is logged but the caller is not failed.
    pub async fn emit(&self, event: ErrorLogEvent) {
        let envelope = ErrorLogEnvelope {
            timestamp: Utc::now(),
            event,
        };
        if self.tx.is_closed() {
            return;
        }
        if let Err(e) = self.tx.send(envelope).await {
            tracing::error!("Failed to emit error log entry: {}", e);
        }
    }
}
