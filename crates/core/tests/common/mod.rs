//! In-process ArchivesSpace stand-in for integration tests.
//!
//! Serves the three endpoints the ingest talks to and records every call so
//! tests can assert on what went over the wire.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Re-export fixtures for test convenience
pub use aspace_ingest_core::testing::fixtures;

const SESSION_HEADER: &str = "X-ArchivesSpace-Session";

#[derive(Debug, Clone)]
pub struct RecordedLogin {
    pub username: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub session: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// Mutable behaviour and call history of the mock backend.
#[derive(Default)]
pub struct BackendState {
    logins: Mutex<Vec<RecordedLogin>>,
    converts: Mutex<Vec<RecordedCall>>,
    uploads: Mutex<Vec<RecordedCall>>,
    sessions_issued: AtomicUsize,
    /// Non-zero makes every login answer with this status.
    login_status: AtomicU16,
    /// Canned (status, body) per marker found in the request body.
    convert_overrides: Mutex<HashMap<String, (u16, String)>>,
    upload_overrides: Mutex<HashMap<String, (u16, String)>>,
}

impl BackendState {
    pub fn reject_logins(&self, status: u16) {
        self.login_status.store(status, Ordering::SeqCst);
    }

    pub fn convert_responds(&self, marker: &str, status: u16, body: &str) {
        self.convert_overrides
            .lock()
            .unwrap()
            .insert(marker.to_string(), (status, body.to_string()));
    }

    pub fn upload_responds(&self, marker: &str, status: u16, body: &str) {
        self.upload_overrides
            .lock()
            .unwrap()
            .insert(marker.to_string(), (status, body.to_string()));
    }

    pub fn logins(&self) -> Vec<RecordedLogin> {
        self.logins.lock().unwrap().clone()
    }

    pub fn converts(&self) -> Vec<RecordedCall> {
        self.converts.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<RecordedCall> {
        self.uploads.lock().unwrap().clone()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn record(headers: &HeaderMap, body: &str) -> RecordedCall {
    RecordedCall {
        session: header(headers, SESSION_HEADER),
        content_type: header(headers, "content-type"),
        body: body.to_string(),
    }
}

fn canned(overrides: &Mutex<HashMap<String, (u16, String)>>, body: &str) -> Option<Response> {
    let overrides = overrides.lock().unwrap();
    overrides
        .iter()
        .find(|(marker, _)| body.contains(marker.as_str()))
        .map(|(_, (status, body))| {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body.clone()).into_response()
        })
}

async fn login(
    State(state): State<Arc<BackendState>>,
    Path(username): Path<String>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    state.logins.lock().unwrap().push(RecordedLogin {
        username,
        password: params.get("password").cloned(),
    });

    let status = state.login_status.load(Ordering::SeqCst);
    if status != 0 {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::FORBIDDEN);
        return (status, Json(json!({"error": "Login failed"}))).into_response();
    }

    let n = state.sessions_issued.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({"session": format!("sess-{}", n), "user": {}})).into_response()
}

async fn convert(
    State(state): State<Arc<BackendState>>,
    Path((_repo_id, _method)): Path<(u32, String)>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.converts.lock().unwrap().push(record(&headers, &body));
    if let Some(response) = canned(&state.convert_overrides, &body) {
        return response;
    }
    Json(json!([{"jsonmodel_type": "resource", "source": body}])).into_response()
}

async fn upload(
    State(state): State<Arc<BackendState>>,
    Path(_repo_id): Path<u32>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.uploads.lock().unwrap().push(record(&headers, &body));
    if let Some(response) = canned(&state.upload_overrides, &body) {
        return response;
    }
    if serde_json::from_str::<Value>(&body).is_err() {
        return (StatusCode::BAD_REQUEST, "invalid json").into_response();
    }
    Json(json!([
        {"saved": {"/repositories/2/resources/import_1": ["/repositories/2/resources/1"]}},
        {"errors": []}
    ]))
    .into_response()
}

/// A running mock backend bound to an ephemeral local port.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
    task: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        let router = Router::new()
            .route("/users/{username}/login", post(login))
            .route(
                "/repositories/{repo_id}/jsonmodel_from_format/resource/{method}",
                post(convert),
            )
            .route("/repositories/{repo_id}/batch_imports", post(upload))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let task = tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self { addr, state, task }
    }

    pub fn uri(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}
