//! In-process stand-in for a registry agent.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::StatusCode;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: String,
}

impl Recorded {
    /// Decoded `note` query parameter, if any.
    pub fn note(&self) -> Option<String> {
        let query = self.query.as_deref()?;
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
        pairs.into_iter().find(|(k, _)| k == "note").map(|(_, v)| v)
    }
}

#[derive(Clone)]
struct StubState {
    register_status: StatusCode,
    check_status: StatusCode,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct StubAgent {
    pub addr: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubAgent {
    /// Agent that accepts everything.
    pub async fn start() -> Self {
        Self::with_statuses(StatusCode::OK, StatusCode::OK).await
    }

    pub async fn with_statuses(register_status: StatusCode, check_status: StatusCode) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new().fallback(record).with_state(StubState {
            register_status,
            check_status,
            requests: requests.clone(),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, prefix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(prefix))
            .collect()
    }

    /// Wait until at least `count` requests under `prefix` have arrived.
    pub async fn wait_for(&self, prefix: &str, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.requests_to(prefix).len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for registry requests");
    }
}

async fn record(State(state): State<StubState>, req: Request) -> StatusCode {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let body = to_bytes(req.into_body(), usize::MAX).await.unwrap_or_default();

    let status = if path.starts_with("/v1/agent/service/register") {
        state.register_status
    } else if path.starts_with("/v1/agent/check/") {
        state.check_status
    } else {
        StatusCode::OK
    };

    state.requests.lock().unwrap().push(Recorded {
        method,
        path,
        query,
        body: String::from_utf8_lossy(&body).into_owned(),
    });
    status
}

pub fn body_of(request: &Recorded) -> serde_json::Value {
    serde_json::from_str(&request.body).unwrap()
}
