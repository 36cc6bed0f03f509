//! In-process mock of the resource API for integration tests.
//!
//! Serves the list/add/delete/job routes under `/api/v1` on a random local
//! port. Each test builds a `MockState` describing how the server should
//! misbehave and inspects the recorded requests afterwards.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Server behavior knobs and request log.
#[derive(Default)]
pub struct MockState {
    /// Status returned by list/add/delete instead of success.
    pub fail_status: Option<u16>,
    /// Body sent with `fail_status`.
    pub fail_body: String,
    /// Delay before answering the list route.
    pub list_delay: Duration,
    /// Job polls answered with 503 before any status is reported.
    pub failing_polls: u32,
    /// Poll number (1-based) from which the job reports "End".
    pub end_after_polls: u32,
    /// Number of job polls served so far.
    pub job_polls: AtomicU32,
    /// "METHOD /route" for every request received.
    pub requests: Mutex<Vec<String>>,
    /// Last JSON body received by the add route.
    pub last_body: Mutex<Option<Value>>,
}

impl MockState {
    fn record(&self, line: String) {
        self.requests.lock().unwrap().push(line);
    }

    fn failure(&self) -> Option<Response> {
        self.fail_status.map(|status| {
            let status = StatusCode::from_u16(status).unwrap();
            (status, self.fail_body.clone()).into_response()
        })
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn polls(&self) -> u32 {
        self.job_polls.load(Ordering::SeqCst)
    }
}

/// A running mock server.
pub struct MockApi {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockApi {
    /// Endpoint URL to hand to `ApiClient`.
    pub fn endpoint(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }
}

/// Start the mock server on a random port.
pub async fn spawn(state: MockState) -> MockApi {
    let state = Arc::new(state);
    let app = Router::new()
        .route("/api/v1/path", get(list))
        .route("/api/v1/path/{id}", post(add).delete(delete))
        .route("/api/v1/jobs/{job_id}", get(get_job))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi { addr, state }
}

/// An address nothing listens on.
pub async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/v1")
}

async fn list(State(state): State<Arc<MockState>>) -> Response {
    state.record("GET /path".into());
    if !state.list_delay.is_zero() {
        tokio::time::sleep(state.list_delay).await;
    }
    if let Some(resp) = state.failure() {
        return resp;
    }
    Json(json!([{ "id": "a", "name": 1 }, { "id": "b", "name": 2 }])).into_response()
}

async fn add(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.record(format!("POST /path/{id}"));
    *state.last_body.lock().unwrap() = Some(body);
    if let Some(resp) = state.failure() {
        return resp;
    }
    Json(json!({ "job_id": format!("job-{id}"), "job_status": 0 })).into_response()
}

async fn delete(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    state.record(format!("DELETE /path/{id}"));
    if let Some(resp) = state.failure() {
        return resp;
    }
    Json(json!({ "job_id": format!("job-{id}"), "job_status": 0 })).into_response()
}

async fn get_job(State(state): State<Arc<MockState>>, Path(job_id): Path<String>) -> Response {
    state.record(format!("GET /jobs/{job_id}"));
    let poll = state.job_polls.fetch_add(1, Ordering::SeqCst) + 1;
    if poll <= state.failing_polls {
        return (StatusCode::SERVICE_UNAVAILABLE, "warming up").into_response();
    }
    let status = if poll >= state.end_after_polls { "End" } else { "Running" };
    Json(json!({ "job_id": job_id, "job_status": status })).into_response()
}
