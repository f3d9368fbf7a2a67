use async_trait::async_trait;
use thiserror::Error;

use super::types::{RawResponse, RequestDescriptor};

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP client could not be created: {0}")]
    Client(String),
}

/// Executes request descriptors against the backend.
///
/// A non-200 status is not an error at this level; callers interpret the
/// returned `RawResponse` themselves.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError>;
}
