//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{RawResponse, RequestBody, RequestDescriptor, Transport, TransportError};

/// Transport that performs real HTTP requests.
///
/// No request timeout is configured; the client's defaults apply.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .gzip(true)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (shared connection pool).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::ConnectionFailed(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        let mut builder = self.client.post(&request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(params) => builder.form(params),
            RequestBody::Bytes(bytes) => builder.body(bytes.clone()),
            // serialize by hand so an explicit content-type header is not overridden
            RequestBody::Json(value) => builder.body(
                serde_json::to_vec(value).map_err(|e| TransportError::Request(e.to_string()))?,
            ),
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        debug!(url = %request.url, status, bytes = body.len(), "Request completed");

        Ok(RawResponse { status, body })
    }
}
