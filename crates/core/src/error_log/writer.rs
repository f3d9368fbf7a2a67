use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use super::{ErrorLogEnvelope, ErrorLogHandle};

/// Destination for formatted error log entries
///
/// `write_entry` may block; the writer calls it on tokio's blocking pool.
pub trait ErrorLogSink: Send + Sync {
    fn write_entry(&self, envelope: &ErrorLogEnvelope) -> io::Result<()>;
}

/// Append-only file sink
pub struct FileErrorLogSink {
    file: Mutex<File>,
}

impl FileErrorLogSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ErrorLogSink for FileErrorLogSink {
    fn write_entry(&self, envelope: &ErrorLogEnvelope) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("error log file lock poisoned"))?;
        write!(file, "{}", envelope)?;
        file.flush()
    }
}

/// Background task that receives entries and writes them to the sink
pub struct ErrorLogWriter {
    rx: mpsc::Receiver<ErrorLogEnvelope>,
    sink: Arc<dyn ErrorLogSink>,
}

impl ErrorLogWriter {
    pub fn new(rx: mpsc::Receiver<ErrorLogEnvelope>, sink: Arc<dyn ErrorLogSink>) -> Self {
        Self { rx, sink }
    }

    /// Run the writer, consuming entries until every handle is dropped
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        tracing::debug!("Error log writer started");

        while let Some(envelope) = self.rx.recv().await {
            // Sinks do blocking file I/O; keep it off the runtime's workers.
            let sink = Arc::clone(&self.sink);
            match tokio::task::spawn_blocking(move || sink.write_entry(&envelope)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Failed to write error log entry: {}", e),
                Err(e) => tracing::error!("Error log write task failed: {}", e),
            }
        }

        tracing::debug!("Error log writer shutting down");
    }
}

/// Create a complete error log system
///
/// Returns:
/// - `ErrorLogHandle` - for emitting entries (clone this to share across tasks)
/// - `ErrorLogWriter` - spawn this as a background task with `tokio::spawn(writer.run())`
pub fn create_error_log(
    sink: Arc<dyn ErrorLogSink>,
    buffer_size: usize,
) -> (ErrorLogHandle, ErrorLogWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let handle = ErrorLogHandle::new(tx);
    let writer = ErrorLogWriter::new(rx, sink);
    (handle, writer)
}
