//! In-process stand-in for the student-records backend.
//!
//! Serves the same REST surface on `127.0.0.1:0` with axum and keeps its
//! documents in memory, so the real [`BackendApi`] can be exercised end to
//! end without a network dependency.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "secret";
pub const TOKEN: &str = "test-token";

/// Mutable state shared by the fake's handlers.
#[derive(Debug, Default)]
pub struct Inner {
    pub students: Vec<Value>,
    pub next_id: u32,
    /// `x-request-id` of every request received, in order.
    pub request_ids: Vec<Option<String>>,
    /// When set, `PUT /api/updatestudent` answers 500.
    pub fail_updates: bool,
    /// When set, `POST /api/addstudent` answers a bare 401.
    pub refuse_adds: bool,
}

pub type Shared = Arc<Mutex<Inner>>;

/// A running fake backend.
pub struct FakeBackend {
    pub base_url: String,
    pub state: Shared,
}

impl FakeBackend {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Insert a stored document directly, returning its `_id`.
    pub fn seed(&self, mut doc: Value) -> String {
        let mut inner = self.state.lock().unwrap();
        inner.next_id += 1;
        let id = format!("id-{}", inner.next_id);
        doc["_id"] = json!(id);
        inner.students.push(doc);
        id
    }

    pub fn students(&self) -> Vec<Value> {
        self.state.lock().unwrap().students.clone()
    }

    pub fn request_ids(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().request_ids.clone()
    }

    pub fn fail_updates(&self) {
        self.state.lock().unwrap().fail_updates = true;
    }

    pub fn refuse_adds(&self) {
        self.state.lock().unwrap().refuse_adds = true;
    }
}

/// A stored document in the backend's shape.
pub fn student_doc(roll_no: &str, name: &str, course: &str) -> Value {
    json!({
        "rollNo": roll_no,
        "name": name,
        "dob": "2000-01-15T00:00:00.000Z",
        "course": course,
        "internship": ["MS Word", "MS Excel"],
        "duration": "3 Months",
        "__v": 0
    })
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/addstudent", post(add_student))
        .route("/api/searchStudent", post(search_student))
        .route("/api/getAllStudents", get(list_students))
        .route("/api/updatestudent", put(update_student))
        .route("/api/deletestudent/{id}", delete(delete_student))
        .with_state(state)
}

fn record_request(state: &Shared, headers: &HeaderMap) {
    let id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().unwrap().request_ids.push(id);
}

fn same_day(stored: &Value, dob: &str) -> bool {
    stored["dob"]
        .as_str()
        .is_some_and(|s| s.get(..10) == dob.get(..10))
}

async fn login(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_request(&state, &headers);
    if body["email"] == ADMIN_EMAIL && body["password"] == ADMIN_PASSWORD {
        Json(json!({ "success": true, "token": TOKEN }))
    } else {
        Json(json!({ "success": false, "message": "Invalid credentials" }))
    }
}

async fn add_student(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    record_request(&state, &headers);
    let mut inner = state.lock().unwrap();
    if inner.refuse_adds {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if inner.students.iter().any(|s| s["rollNo"] == body["rollNo"]) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Student with this Roll No already exists" })),
        )
            .into_response();
    }
    inner.next_id += 1;
    body["_id"] = json!(format!("id-{}", inner.next_id));
    inner.students.push(body.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Student added successfully", "student": body })),
    )
        .into_response()
}

async fn search_student(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_request(&state, &headers);
    let dob = body["dob"].as_str().unwrap_or_default().to_string();
    let inner = state.lock().unwrap();
    match inner
        .students
        .iter()
        .find(|s| s["rollNo"] == body["rollNo"] && same_day(s, &dob))
    {
        Some(found) => Json(found.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Student not found" })),
        )
            .into_response(),
    }
}

async fn list_students(State(state): State<Shared>, headers: HeaderMap) -> Response {
    record_request(&state, &headers);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Login required" })),
        )
            .into_response();
    }
    Json(Value::Array(state.lock().unwrap().students.clone())).into_response()
}

async fn update_student(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_request(&state, &headers);
    let mut inner = state.lock().unwrap();
    if inner.fail_updates {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "db down" })),
        )
            .into_response();
    }
    let Some(stored) = inner
        .students
        .iter_mut()
        .find(|s| s["rollNo"] == body["rollNo"])
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    for field in ["name", "course", "duration", "internship"] {
        stored[field] = body[field].clone();
    }
    Json(json!({ "message": "Student updated" })).into_response()
}

async fn delete_student(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    record_request(&state, &headers);
    let mut inner = state.lock().unwrap();
    let before = inner.students.len();
    inner.students.retain(|s| s["_id"] != id.as_str());
    if inner.students.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Student not found" })),
        )
            .into_response();
    }
    Json(json!({ "message": "Student deleted" })).into_response()
}
