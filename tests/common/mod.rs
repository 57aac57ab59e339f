//! In-process stand-in for the voice-assistant service: REST endpoints plus a live event socket.

#![allow(dead_code)]

use axum::extract::ws::{Message, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use callterm::config::{EventsUrlTemplate, ServiceConfig};
use reqwest::Url;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

pub const API_KEY: &str = "test-key-123456";
pub const CALL_ID: &str = "call-42";

/// Frames the mock pushes to every feed subscriber right after upgrade.
pub const LIVE_FRAMES: &[&str] = &[
    r#"{"type":"call-start"}"#,
    r#"{"type":"speech-start"}"#,
    r#"{"type":"volume-level","volume":0.4}"#,
];

#[derive(Default)]
pub struct Recorded {
    pub start_bodies: Vec<Value>,
    pub control_bodies: Vec<Value>,
    pub details_requests: Vec<String>,
    pub auth_headers: Vec<String>,
}

#[derive(Clone)]
pub struct MockState {
    pub addr: SocketAddr,
    pub recorded: Arc<Mutex<Recorded>>,
    pub details: Value,
    /// When set, `POST /call` answers with this status instead of a call.
    pub start_status: Option<StatusCode>,
    /// Frames sent after `LIVE_FRAMES`; the socket then stays open until the client leaves.
    pub extra_frames: Vec<String>,
}

pub struct MockService {
    pub runtime: Runtime,
    pub state: MockState,
}

impl MockService {
    pub fn start(details: Value) -> Self {
        Self::start_with(details, None, Vec::new())
    }

    pub fn start_with(
        details: Value,
        start_status: Option<StatusCode>,
        extra_frames: Vec<String>,
    ) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("mock runtime");
        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("bind mock");
        let addr = listener.local_addr().expect("mock addr");
        let state = MockState {
            addr,
            recorded: Arc::new(Mutex::new(Recorded::default())),
            details,
            start_status,
            extra_frames,
        };
        let app = Router::new()
            .route("/call", post(start_call))
            .route("/call/{id}", get(call_details))
            .route("/call/{id}/control", post(control))
            .route("/feed", get(feed))
            .with_state(state.clone());
        runtime.spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });
        Self { runtime, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.state.addr)
    }

    pub fn service_config(&self) -> ServiceConfig {
        let api_url = Url::parse(&self.base_url()).expect("base url");
        ServiceConfig {
            events_url: EventsUrlTemplate::new(format!(
                "ws://{}/call/{{call_id}}/events",
                self.state.addr
            )),
            api_url,
            api_key: API_KEY.to_string(),
            assistant_id: "asst-1".to_string(),
            phone_number_id: Some("phone-1".to_string()),
            request_timeout: Duration::from_secs(5),
        }
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.state.recorded.lock().expect("recorded lock")
    }
}

fn record_auth(state: &MockState, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state
        .recorded
        .lock()
        .expect("recorded lock")
        .auth_headers
        .push(auth);
}

async fn start_call(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_auth(&state, &headers);
    state
        .recorded
        .lock()
        .expect("recorded lock")
        .start_bodies
        .push(body);
    if let Some(status) = state.start_status {
        return (status, "assistant unavailable").into_response();
    }
    Json(json!({
        "id": CALL_ID,
        "monitor": { "eventsUrl": format!("ws://{}/feed", state.addr) }
    }))
    .into_response()
}

async fn control(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    record_auth(&state, &headers);
    let mut recorded = state.recorded.lock().expect("recorded lock");
    recorded
        .control_bodies
        .push(json!({ "id": id, "body": body }));
    StatusCode::OK
}

async fn call_details(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    record_auth(&state, &headers);
    state
        .recorded
        .lock()
        .expect("recorded lock")
        .details_requests
        .push(id);
    Json(state.details.clone())
}

async fn feed(State(state): State<MockState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |mut socket| async move {
        let frames = LIVE_FRAMES
            .iter()
            .map(|frame| frame.to_string())
            .chain(state.extra_frames.clone());
        for frame in frames {
            if socket.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        while let Some(Ok(_)) = socket.recv().await {}
    })
}
