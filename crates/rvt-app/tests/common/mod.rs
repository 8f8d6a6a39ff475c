use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use rvt_app::{Shell, ShellState};
use rvt_client::{ApiClient, Gateway, MemoryTokenStore, Session};
use serde_json::{Value, json};
use tokio::{net::TcpListener, task::JoinHandle};

pub const TOPIC_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

/// Mutable behaviour and observations of the fake service
#[derive(Debug, Default)]
pub struct ServiceState {
    pub fail_bulk: AtomicBool,
    pub topic_loads: AtomicUsize,
    pub queue_body: Mutex<Option<Value>>,
    pub queue_auth: Mutex<Option<String>>,
    pub queue_mode: Mutex<Option<String>>,
    pub bulk_bodies: Mutex<Vec<Value>>,
    pub revision_bodies: Mutex<Vec<Value>>,
}

pub fn read<T: Clone>(value: &Mutex<T>) -> T {
    value.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

fn write<T>(value: &Mutex<T>, new: T) {
    *value.lock().unwrap_or_else(PoisonError::into_inner) = new;
}

type Shared = Arc<ServiceState>;

/// In-process revision tracker service
pub struct FakeService {
    pub base_url: String,
    pub state: Shared,
    handle: JoinHandle<()>,
}

impl FakeService {
    pub async fn start() -> Self {
        let state = Shared::default();
        let router = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/revision-queue", get(revision_queue))
            .route(
                "/priority-modes",
                get(|| async { Json(json!({ "modes": ["default", "exam"] })) }),
            )
            .route("/revisions/priority-mode", post(set_mode))
            .route("/topics", get(list_topics))
            .route("/topics/bulk", post(bulk_create))
            .route("/revisions", post(record_revision))
            .route("/syllabus/parse", post(parse_syllabus))
            .route(
                "/revisions/streak",
                get(|| async {
                    Json(json!({ "current_streak": 3, "longest_streak": 7, "active_today": true }))
                }),
            )
            .route(
                "/revisions/daily-goal",
                get(|| async {
                    Json(json!({
                        "goal": 5, "revised_today": 2, "remaining": 3,
                        "progress": 0.4, "completed": false
                    }))
                }),
            )
            .route(
                "/revisions/weekly-summary",
                get(|| async {
                    Json(json!({
                        "total_revised": 6,
                        "average_per_day": 0.86,
                        "days": { "2024-03-01": 4, "2024-03-02": 2 }
                    }))
                }),
            )
            .route(
                "/revisions/subject-balance",
                get(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "detail": "Balance unavailable" })),
                    )
                }),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake service");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    pub fn set_queue_body(&self, body: Value) {
        write(&self.state.queue_body, Some(body));
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A shell wired to a fresh fake service
pub struct Harness {
    pub service: FakeService,
    pub session: Session,
    pub shell: Shell,
}

impl Harness {
    pub async fn start(token: Option<&str>) -> Self {
        let service = FakeService::start().await;
        let session = match token {
            Some(token) => Session::new(MemoryTokenStore::with_token(token)),
            None => Session::in_memory(),
        };
        let gateway =
            Gateway::new(&service.base_url, Duration::from_secs(5)).expect("Failed to build gateway");
        let shell = Shell::new(
            ApiClient::new(gateway, session.clone()),
            Duration::from_millis(20),
        );

        Self {
            service,
            session,
            shell,
        }
    }

    /// Process messages until `done` holds for the shell
    pub async fn step_until(&mut self, done: impl Fn(&Shell) -> bool) {
        let shell = &mut self.shell;
        tokio::time::timeout(Duration::from_secs(5), async {
            while !done(&*shell) {
                assert!(shell.step().await, "Shell closed while waiting");
            }
        })
        .await
        .expect("Timed out waiting for the shell");
    }
}

pub fn workspace_token(shell: &Shell) -> Option<&str> {
    match shell.state() {
        ShellState::Authenticated(workspace) => Some(workspace.token()),
        _ => None,
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match (body["email"].as_str(), body["password"].as_str()) {
        (Some("a@x.com"), Some("secret")) => (
            StatusCode::OK,
            Json(json!({ "access_token": "T1", "token_type": "bearer" })),
        ),
        (Some("broken@x.com"), _) => (StatusCode::OK, Json(json!({ "token_type": "bearer" }))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid email or password" })),
        ),
    }
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::CREATED,
        Json(json!({
            "id": "6f1c2a34-5b6d-4e7f-8a9b-0c1d2e3f4a5b",
            "email": body["email"],
            "created_at": "2024-03-01T10:00:00"
        })),
    )
}

async fn revision_queue(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    write(&state.queue_auth, bearer(&headers));
    write(&state.queue_mode, query.get("mode").cloned());
    Json(read(&state.queue_body).unwrap_or(Value::Null))
}

async fn set_mode(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "priority_mode": body["mode"] }))
}

async fn list_topics(State(state): State<Shared>) -> Json<Value> {
    state.topic_loads.fetch_add(1, Ordering::SeqCst);
    Json(json!([{
        "id": TOPIC_ID,
        "name": "Limits",
        "subject": "Math",
        "unit": "Calculus",
        "difficulty": 4,
        "importance": 5,
        "created_at": "2024-03-01T10:00:00",
        "last_revised": null
    }]))
}

async fn record_revision(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    state
        .revision_bodies
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(body.clone());
    Json(json!({
        "id": "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d",
        "topic_id": body["topic_id"],
        "confidence": body["confidence"],
        "timestamp": "2024-03-02T08:30:00"
    }))
}

async fn parse_syllabus(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["text"].as_str().is_some_and(|text| text.contains("Algebra")) {
        (
            StatusCode::OK,
            Json(json!({
                "count": 1,
                "topics": [{ "name": "Algebra", "subject": "Math", "difficulty": 2, "importance": 3 }]
            })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "No topics could be parsed" })),
        )
    }
}

async fn bulk_create(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if state.fail_bulk.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "Database unavailable" })),
        );
    }

    let created = body.as_array().map_or(0, Vec::len);
    state
        .bulk_bodies
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(body);
    (StatusCode::OK, Json(json!({ "created": created })))
}
