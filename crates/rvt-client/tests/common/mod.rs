use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    routing::get,
};
use rvt_client::{ApiClient, Gateway, MemoryTokenStore, Session};
use serde_json::{Value, json};
use tokio::{net::TcpListener, task::JoinHandle};

/// One request as the fake service saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

/// Fake revision tracker service on a random local port.
///
/// Known routes answer with canned bodies; any other path echoes the request
/// back as JSON and records it.
pub struct FakeService {
    pub base_url: String,
    log: Log,
    handle: JoinHandle<()>,
}

impl FakeService {
    pub async fn start() -> Self {
        let log = Log::default();
        let router = Router::new()
            .route("/slow", get(slow))
            .route("/errors/detail", get(error_detail))
            .route("/errors/validation", get(error_validation))
            .route("/errors/text", get(error_text))
            .route("/errors/empty", get(error_empty))
            .route("/no-content", get(|| async { StatusCode::NO_CONTENT }))
            .route("/garbage", get(|| async { "<html>not json</html>" }))
            .route(
                "/data-with-detail",
                get(|| async { Json(json!({ "detail": "stored value", "id": 1 })) }),
            )
            .route(
                "/revision-queue",
                get(|| async { Json(json!({ "message": "Nothing to revise" })) }),
            )
            .route("/topics", get(topics))
            .fallback(echo)
            .with_state(log.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake service");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            base_url: format!("http://{addr}"),
            log,
            handle,
        }
    }

    pub fn gateway(&self, timeout: Duration) -> Gateway {
        Gateway::new(&self.base_url, timeout).expect("Failed to build gateway")
    }

    /// Client whose session starts out holding `token`
    pub fn client_with_token(&self, token: Option<&str>) -> ApiClient {
        let session = match token {
            Some(token) => Session::new(MemoryTokenStore::with_token(token)),
            None => Session::in_memory(),
        };
        ApiClient::new(self.gateway(Duration::from_secs(5)), session)
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.recorded()
            .pop()
            .expect("Fake service has not seen any request")
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A base url nothing listens on
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);
    format!("http://{addr}")
}

async fn echo(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let recorded = Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_owned),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    };

    let echoed = json!({
        "method": recorded.method,
        "path": recorded.path,
        "query": recorded.query,
        "authorization": recorded.authorization,
        "body": recorded.body,
    });
    log.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(recorded);

    Json(echoed)
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({ "ok": true }))
}

async fn error_detail() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": "Topic not found" })),
    )
}

async fn error_validation() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "detail": [
                { "loc": ["body", "email"], "msg": "field required", "type": "missing" },
                { "loc": ["body", "password"], "msg": "too short", "type": "value_error" }
            ]
        })),
    )
}

async fn error_text() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn error_empty() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn topics() -> Json<Value> {
    Json(json!([
        {
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "name": "Limits",
            "subject": "Math",
            "unit": "Calculus",
            "difficulty": 4,
            "importance": 5,
            "created_at": "2024-03-01T10:00:00",
            "last_revised": null
        }
    ]))
}
