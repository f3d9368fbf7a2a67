//! Mock transport for testing.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::client::{RawResponse, RequestBody, RequestDescriptor, Transport, TransportError};

/// Backend endpoint a request was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockEndpoint {
    Login,
    Convert,
    Upload,
    Other,
}

impl MockEndpoint {
    /// Classifies a request URL by its ArchivesSpace path.
    pub fn classify(url: &str) -> Self {
        if url.ends_with("/login") {
            Self::Login
        } else if url.contains("/jsonmodel_from_format/") {
            Self::Convert
        } else if url.ends_with("/batch_imports") {
            Self::Upload
        } else {
            Self::Other
        }
    }
}

type Scripted = Result<RawResponse, TransportError>;

/// Responses keyed by a marker found in the request body.
#[derive(Default)]
struct Script {
    default: Option<Scripted>,
    by_marker: Vec<(String, Scripted)>,
    latency: Duration,
}

/// Mock implementation of the Transport trait.
///
/// Provides controllable behavior for testing:
/// - Scripted responses per endpoint, optionally per request-body marker
/// - Simulated latency
/// - Request recording and peak concurrency tracking
///
/// Without a script, login returns a session, conversion echoes the XML into a
/// one-record jsonmodel array and upload reports a clean batch import. Because
/// the echoed XML ends up in the upload payload, markers set for the upload
/// endpoint match on text from the source EAD file.
///
/// # Example
///
/// ```rust,ignore
/// use aspace_ingest_core::testing::{MockEndpoint, MockTransport};
///
/// let transport = MockTransport::new();
/// transport.set_response_for(
///     MockEndpoint::Convert,
///     "broken-ead",
///     RawResponse::new(200, r#"{"error":"bad xml"}"#),
/// );
///
/// // ... run the pipeline ...
///
/// assert_eq!(transport.requests_to(MockEndpoint::Upload), 0);
/// ```
#[derive(Default)]
pub struct MockTransport {
    scripts: Mutex<HashMap<MockEndpoint, Script>>,
    requests: Mutex<Vec<RequestDescriptor>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response for every request to `endpoint` without a marker match.
    pub fn set_response(&self, endpoint: MockEndpoint, response: RawResponse) {
        self.script(endpoint, |s| s.default = Some(Ok(response)));
    }

    pub fn set_login_response(&self, response: RawResponse) {
        self.set_response(MockEndpoint::Login, response);
    }

    /// Make every request to `endpoint` fail at the transport level.
    pub fn set_error(&self, endpoint: MockEndpoint, error: TransportError) {
        self.script(endpoint, |s| s.default = Some(Err(error)));
    }

    /// Set the response for requests to `endpoint` whose body contains `marker`.
    pub fn set_response_for(&self, endpoint: MockEndpoint, marker: &str, response: RawResponse) {
        self.script(endpoint, |s| {
            s.by_marker.push((marker.to_string(), Ok(response)))
        });
    }

    /// Fail requests to `endpoint` whose body contains `marker`.
    pub fn set_error_for(&self, endpoint: MockEndpoint, marker: &str, error: TransportError) {
        self.script(endpoint, |s| s.by_marker.push((marker.to_string(), Err(error))));
    }

    /// Delay every response from `endpoint`.
    pub fn set_latency(&self, endpoint: MockEndpoint, latency: Duration) {
        self.script(endpoint, |s| s.latency = latency);
    }

    /// All requests received so far, in arrival order.
    pub fn recorded_requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received for `endpoint`.
    pub fn requests_to(&self, endpoint: MockEndpoint) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| MockEndpoint::classify(&r.url) == endpoint)
            .count()
    }

    /// Highest number of requests that were in progress at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn script(&self, endpoint: MockEndpoint, f: impl FnOnce(&mut Script)) {
        let mut scripts = self.scripts.lock().unwrap();
        f(scripts.entry(endpoint).or_default());
    }

    fn resolve(&self, endpoint: MockEndpoint, request: &RequestDescriptor) -> (Scripted, Duration) {
        let body = body_text(&request.body);
        let scripts = self.scripts.lock().unwrap();
        let script = scripts.get(&endpoint);
        let latency = script.map(|s| s.latency).unwrap_or_default();

        let scripted = script.and_then(|s| {
            s.by_marker
                .iter()
                .find(|(marker, _)| body.contains(marker.as_str()))
                .map(|(_, r)| r.clone())
                .or_else(|| s.default.clone())
        });

        let result = scripted.unwrap_or_else(|| Ok(default_response(endpoint, &body)));
        (result, latency)
    }
}

fn body_text(body: &RequestBody) -> String {
    match body {
        RequestBody::Empty => String::new(),
        RequestBody::Form(params) => params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&"),
        RequestBody::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        RequestBody::Json(value) => value.to_string(),
    }
}

fn default_response(endpoint: MockEndpoint, body: &str) -> RawResponse {
    match endpoint {
        MockEndpoint::Login => RawResponse::new(200, json!({"session": "mock-session"}).to_string()),
        MockEndpoint::Convert => RawResponse::new(
            200,
            json!([{"jsonmodel_type": "resource", "source": body}]).to_string(),
        ),
        MockEndpoint::Upload => RawResponse::new(
            200,
            json!([
                {"saved": {"/repositories/2/resources/import_1": ["/repositories/2/resources/1"]}},
                {"errors": []}
            ])
            .to_string(),
        ),
        MockEndpoint::Other => RawResponse::new(404, "Not Found"),
    }
}

/// Tracks the number of requests currently inside `send`.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight(&self.in_flight);
        self.peak.fetch_max(current, Ordering::SeqCst);

        let endpoint = MockEndpoint::classify(&request.url);
        let (result, latency) = self.resolve(endpoint, request);

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        result
    }
}
