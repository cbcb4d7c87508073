//! In-process stand-in for the mpv control server.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use remote_proto::protocol::Endpoint;
use remote_sync::RemoteState;
use tokio::net::TcpListener;
use tokio::sync::watch;

pub const SCENARIO_STATUS: &str = r#"{"volume":50,"paused":false,"length":120,"position":30,"title":"movie.mkv","file":"/x","subtitle":"","subtitles":[]}"#;

pub const ENGLISH_STATUS: &str = r#"{"volume":40,"paused":true,"length":5400,"position":61.5,"title":"\"Film\"","file":"film.mkv","subtitle":"false","subtitles":[{"id":1,"title":"jpn"},{"id":2,"title":"English"}]}"#;

pub struct MockPlayer {
    status: Mutex<(StatusCode, String)>,
    status_delay: Mutex<Duration>,
    ping: Mutex<(StatusCode, String)>,
    ping_delay: Mutex<Duration>,
    commands: Mutex<Vec<String>>,
    status_hits: AtomicUsize,
    ping_hits: AtomicUsize,
}

impl MockPlayer {
    pub async fn spawn() -> (Arc<Self>, Endpoint) {
        let mock = Arc::new(Self {
            status: Mutex::new((StatusCode::OK, SCENARIO_STATUS.to_string())),
            status_delay: Mutex::new(Duration::ZERO),
            ping: Mutex::new((StatusCode::OK, "pong".to_string())),
            ping_delay: Mutex::new(Duration::ZERO),
            commands: Mutex::new(Vec::new()),
            status_hits: AtomicUsize::new(0),
            ping_hits: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/ping", get(ping))
            .route("/mpv/status", get(status))
            .route("/mpv/:command", get(command))
            .with_state(mock.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (mock, Endpoint::new("127.0.0.1", port))
    }

    pub fn set_status(&self, body: &str) {
        *self.status.lock().unwrap() = (StatusCode::OK, body.to_string());
    }

    pub fn set_status_code(&self, code: StatusCode, body: &str) {
        *self.status.lock().unwrap() = (code, body.to_string());
    }

    pub fn set_status_delay(&self, delay: Duration) {
        *self.status_delay.lock().unwrap() = delay;
    }

    pub fn set_ping(&self, body: &str) {
        *self.ping.lock().unwrap() = (StatusCode::OK, body.to_string());
    }

    pub fn set_ping_code(&self, code: StatusCode, body: &str) {
        *self.ping.lock().unwrap() = (code, body.to_string());
    }

    pub fn set_ping_delay(&self, delay: Duration) {
        *self.ping_delay.lock().unwrap() = delay;
    }

    /// `name` or `name?query` for every `/mpv/{name}` command received.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn status_hits(&self) -> usize {
        self.status_hits.load(Ordering::SeqCst)
    }

    pub fn ping_hits(&self) -> usize {
        self.ping_hits.load(Ordering::SeqCst)
    }
}

async fn ping(State(mock): State<Arc<MockPlayer>>) -> Response {
    mock.ping_hits.fetch_add(1, Ordering::SeqCst);
    let delay = *mock.ping_delay.lock().unwrap();
    tokio::time::sleep(delay).await;
    let (code, body) = mock.ping.lock().unwrap().clone();
    (code, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

async fn status(State(mock): State<Arc<MockPlayer>>) -> Response {
    mock.status_hits.fetch_add(1, Ordering::SeqCst);
    let delay = *mock.status_delay.lock().unwrap();
    tokio::time::sleep(delay).await;
    let (code, body) = mock.status.lock().unwrap().clone();
    (code, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Records the command; `subtitle?id=N` also switches the served status to
/// subtitle N, like the real player would.
async fn command(
    State(mock): State<Arc<MockPlayer>>,
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
) -> &'static str {
    let entry = match &query {
        Some(q) => format!("{}?{}", name, q),
        None => name.clone(),
    };
    mock.commands.lock().unwrap().push(entry);

    if name == "subtitle" {
        if let Some(id) = query.as_deref().and_then(|q| q.strip_prefix("id=")) {
            let mut status = mock.status.lock().unwrap();
            if let Ok(mut value) = serde_json::from_str::<serde_json::Value>(&status.1) {
                value["subtitle"] = serde_json::Value::String(id.to_string());
                status.1 = value.to_string();
            }
        }
    }
    "ok"
}

/// A port nothing listens on.
pub fn dead_endpoint() -> Endpoint {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Endpoint::new("127.0.0.1", port)
}

pub async fn wait_for(
    rx: &mut watch::Receiver<RemoteState>,
    what: &str,
    pred: impl FnMut(&RemoteState) -> bool,
) -> RemoteState {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {}", what))
        .expect("state channel closed")
        .clone()
}

pub async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {}",
            what
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
