//! Per-file convert-then-upload pipeline.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::auth::SessionToken;
use crate::client::{BackendEndpoints, RawResponse, TransportError};
use crate::dispatcher::Dispatcher;
use crate::error_log::{ErrorLogEvent, ErrorLogHandle};
use crate::exclude::ExcludeSet;

use super::counters::IngestCounters;
use super::response::{interpret_conversion, interpret_upload};
use super::types::{FileOutcome, FileRecord, Phase, PhaseFailure, RequestOutcome};

/// State shared by every completion handler the pipeline registers.
#[derive(Clone)]
struct PipelineShared {
    endpoints: BackendEndpoints,
    counters: Arc<IngestCounters>,
    error_log: ErrorLogHandle,
    error_log_name: String,
    outcomes: Option<mpsc::UnboundedSender<FileOutcome>>,
}

/// Drives each file through `Queued → (Skipped | ConvertPending)`,
/// `ConvertPending → (ConvertFailed | UploadPending)` and
/// `UploadPending → (UploadFailed | Succeeded)`.
///
/// Requests run on the shared [`Dispatcher`]; the upload is enqueued from the
/// conversion's completion handler, so callers must drain the dispatcher to
/// wait for a file to reach its terminal state.
pub struct IngestPipeline {
    shared: Arc<PipelineShared>,
    exclude: Arc<ExcludeSet>,
    dispatcher: Dispatcher,
}

impl IngestPipeline {
    pub fn new(
        endpoints: BackendEndpoints,
        exclude: Arc<ExcludeSet>,
        dispatcher: Dispatcher,
        counters: Arc<IngestCounters>,
    ) -> Self {
        Self {
            shared: Arc::new(PipelineShared {
                endpoints,
                counters,
                error_log: ErrorLogHandle::disabled(),
                error_log_name: "error log".to_string(),
                outcomes: None,
            }),
            exclude,
            dispatcher,
        }
    }

    /// Route raw failure bodies to the error log. `name` is quoted in the
    /// ingest log so readers know where to look.
    pub fn with_error_log(mut self, handle: ErrorLogHandle, name: impl Into<String>) -> Self {
        let shared = Arc::make_mut(&mut self.shared);
        shared.error_log = handle;
        shared.error_log_name = name.into();
        self
    }

    /// Report every terminal file state on `tx`.
    pub fn with_outcome_sender(mut self, tx: mpsc::UnboundedSender<FileOutcome>) -> Self {
        Arc::make_mut(&mut self.shared).outcomes = Some(tx);
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn counters(&self) -> &Arc<IngestCounters> {
        &self.shared.counters
    }

    /// Start processing `file` under `session`.
    ///
    /// Skipped files are settled immediately; otherwise the conversion request
    /// is enqueued and this returns without waiting for it.
    pub async fn submit(&self, file: FileRecord, session: &SessionToken) {
        let shared = &self.shared;
        shared.counters.record_entry();

        if self.exclude.should_skip(&file) {
            shared.counters.record_excluded();
            info!(
                "Conversion of '{}' skipped per exclude list",
                file.display_name()
            );
            shared.report(file, RequestOutcome::Skipped, None);
            return;
        }

        let xml = match tokio::fs::read(file.path()).await {
            Ok(xml) => xml,
            Err(e) => {
                shared
                    .fail(file, Phase::Conversion, PhaseFailure::Io(e.to_string()))
                    .await;
                return;
            }
        };

        let request = shared.endpoints.convert_request(session, xml);
        let shared = Arc::clone(shared);
        let session = session.clone();
        self.dispatcher.enqueue(request, move |result, dispatcher| async move {
            shared.on_converted(file, session, result, dispatcher).await;
        });
    }
}

impl PipelineShared {
    async fn on_converted(
        self: Arc<Self>,
        file: FileRecord,
        session: SessionToken,
        result: Result<RawResponse, TransportError>,
        dispatcher: Dispatcher,
    ) {
        let payload = match result
            .map_err(|e| PhaseFailure::Transport(e.to_string()))
            .and_then(|response| interpret_conversion(&response))
        {
            Ok(payload) => payload,
            Err(failure) => {
                self.fail(file, Phase::Conversion, failure).await;
                return;
            }
        };

        info!("Conversion of '{}' succeeded", file.display_name());

        let request = self.endpoints.upload_request(&session, payload);
        dispatcher.enqueue(request, move |result, _| async move {
            self.on_uploaded(file, result).await;
        });
    }

    async fn on_uploaded(&self, file: FileRecord, result: Result<RawResponse, TransportError>) {
        match result
            .map_err(|e| PhaseFailure::Transport(e.to_string()))
            .and_then(|response| interpret_upload(&response))
        {
            Ok(_) => {
                self.counters.record_success();
                info!("Upload of '{}' succeeded", file.display_name());
                self.report(file, RequestOutcome::Succeeded, None);
            }
            Err(failure) => self.fail(file, Phase::Upload, failure).await,
        }
    }

    async fn fail(&self, file: FileRecord, phase: Phase, failure: PhaseFailure) {
        let name = file.display_name();
        let title = match phase {
            Phase::Conversion => "Conversion",
            Phase::Upload => "Upload",
        };

        match &failure {
            PhaseFailure::Status { status, body } => {
                warn!(
                    "{} of '{}' failed with code '{}', body of response is in '{}'",
                    title, name, status, self.error_log_name
                );
                self.error_log
                    .emit(ErrorLogEvent::response(phase, &name, *status, body.clone()))
                    .await;
            }
            PhaseFailure::Rejected(error) => {
                warn!("{} of '{}' failed with error '{}'", title, name, error);
            }
            PhaseFailure::Malformed { reason, body } => {
                warn!(
                    "{} of '{}' failed with an unreadable response ({}), body of response is in '{}'",
                    title, name, reason, self.error_log_name
                );
                self.error_log
                    .emit(ErrorLogEvent::response(phase, &name, 200, body.clone()))
                    .await;
            }
            PhaseFailure::Transport(message) | PhaseFailure::Io(message) => {
                warn!("{} of '{}' failed: {}", title, name, message);
                self.error_log
                    .emit(ErrorLogEvent::failure(phase, &name, message.clone()))
                    .await;
            }
        }

        let outcome = match phase {
            Phase::Conversion => RequestOutcome::ConvertFailed,
            Phase::Upload => RequestOutcome::UploadFailed,
        };
        self.report(file, outcome, Some(failure));
    }

    fn report(&self, file: FileRecord, outcome: RequestOutcome, failure: Option<PhaseFailure>) {
        if let Some(tx) = &self.outcomes {
            // Nobody listening is fine; counters remain authoritative.
            let _ = tx.send(FileOutcome {
                file,
                outcome,
                failure,
            });
        }
    }
}
