//! In-process mock of the service's REST API.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use vrepl_ctl::client::DEFAULT_APPLY_PATH;

#[derive(Clone)]
pub struct MockCluster {
    /// `code` returned by every endpoint.
    code: i64,
    requests: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

impl MockCluster {
    pub fn accepting() -> Self {
        Self::with_code(0)
    }

    pub fn with_code(code: i64) -> Self {
        Self {
            code,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start serving on an ephemeral port and return `http://host:port`.
    pub async fn serve(&self) -> String {
        let router = Router::new()
            .route(DEFAULT_APPLY_PATH, post(handle_apply))
            .route("/v2/vectordb/collections/drop", post(handle_drop))
            .route("/v2/vectordb/collections/create", post(handle_create))
            .route("/v2/vectordb/entities/insert", post(handle_insert))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Recorded `(route, bearer token, body)` triples in arrival order.
    pub fn requests(&self) -> Vec<(String, Option<String>, Value)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, route: &str) -> usize {
        self.requests().iter().filter(|(r, _, _)| r == route).count()
    }

    fn record(&self, route: &str, headers: &HeaderMap, body: Value) -> Json<Value> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);
        self.requests
            .lock()
            .unwrap()
            .push((route.to_string(), token, body));

        if self.code == 0 {
            Json(json!({ "code": 0, "data": {} }))
        } else {
            Json(json!({ "code": self.code, "message": "rejected by mock" }))
        }
    }
}

async fn handle_apply(
    State(mock): State<MockCluster>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    mock.record("apply", &headers, body)
}

async fn handle_drop(
    State(mock): State<MockCluster>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    mock.record("drop", &headers, body)
}

async fn handle_create(
    State(mock): State<MockCluster>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    mock.record("create", &headers, body)
}

async fn handle_insert(
    State(mock): State<MockCluster>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    mock.record("insert", &headers, body)
}

/// An address nothing listens on.
pub fn unreachable_addr() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
