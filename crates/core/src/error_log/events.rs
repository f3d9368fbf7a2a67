use chrono::{DateTime, Utc};
use std::fmt;

use crate::ingest::Phase;

const START_MARKER: &str = "<<<<<<<<<<<<<<<<<<<<<<<<<<<";
const END_MARKER: &str = ">>>>>>>>>>>>>>>>>>>>>>>>>>>";

/// What went wrong with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// The backend answered; the raw body is kept for diagnosis.
    Response { status: u16, body: String },
    /// No usable response (transport or local I/O failure).
    Failure { message: String },
}

/// One entry of the error-response log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLogEvent {
    pub phase: Phase,
    /// File the failed request belonged to.
    pub file: String,
    pub detail: ErrorDetail,
}

impl ErrorLogEvent {
    pub fn response(phase: Phase, file: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            phase,
            file: file.into(),
            detail: ErrorDetail::Response {
                status,
                body: body.into(),
            },
        }
    }

    pub fn failure(phase: Phase, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            phase,
            file: file.into(),
            detail: ErrorDetail::Failure {
                message: message.into(),
            },
        }
    }
}

/// Envelope wrapping an error log event with the time it was emitted
#[derive(Debug, Clone)]
pub struct ErrorLogEnvelope {
    pub timestamp: DateTime<Utc>,
    pub event: ErrorLogEvent,
}

impl fmt::Display for ErrorLogEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, text) = match &self.event.detail {
            ErrorDetail::Response { body, .. } => ("Response", body.as_str()),
            ErrorDetail::Failure { message } => ("Error", message.as_str()),
        };

        writeln!(
            f,
            "{} for '{}' at {} [{}]",
            kind,
            self.event.file,
            self.timestamp.to_rfc3339(),
            self.event.phase.as_str().to_uppercase()
        )?;
        if let ErrorDetail::Response { status, .. } = &self.event.detail {
            writeln!(f, "HTTP {}", status)?;
        }
        writeln!(f, "{}", START_MARKER)?;
        writeln!(f, "{}", text)?;
        writeln!(f, "{}", END_MARKER)
    }
}
