//! In-process fake HR backend for integration tests.
//!
//! Serves the employee and contract endpoints from memory on an ephemeral
//! port. The server runs on its own thread with its own tokio runtime so
//! tests can drive it with the blocking client or the compiled binary.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, patch};
use serde_json::{Value, json};

#[derive(Debug, Default)]
pub struct BackendState {
    pub employees: Vec<Value>,
    pub contracts: Vec<Value>,
    pub next_id: i64,
    /// Query strings received by `GET /employees`, in order.
    pub employee_queries: Vec<HashMap<String, String>>,
    /// Value of `X-Tenant` on the last request, if any.
    pub last_tenant: Option<String>,
    /// Body returned by `GET /employees` instead of the stored rows.
    pub list_override: Option<Value>,
    /// Status and body returned by the next mutating request.
    pub reject_next: Option<(StatusCode, Value)>,
    pub mutations: usize,
}

type Shared = Arc<Mutex<BackendState>>;

pub struct FakeBackend {
    pub base_url: String,
    state: Shared,
}

impl FakeBackend {
    pub fn start() -> Self {
        Self::with_employees(0)
    }

    /// Backend seeded with employees named `Person No{id}` (ids from 1).
    pub fn with_employees(count: usize) -> Self {
        let mut state = BackendState::default();
        for id in 1..=count as i64 {
            state.employees.push(employee_json(id, "Person", &format!("No{id}")));
        }
        state.next_id = count as i64;
        let state = Arc::new(Mutex::new(state));

        let app = router(state.clone());
        let (tx, rx) = std::sync::mpsc::channel::<SocketAddr>();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .expect("tokio runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind");
                tx.send(listener.local_addr().expect("local addr"))
                    .expect("send addr");
                axum::serve(listener, app).await.expect("serve");
            });
        });
        let addr = rx.recv().expect("backend address");
        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("backend state")
    }
}

pub fn employee_json(id: i64, first: &str, last: &str) -> Value {
    json!({
        "id": id,
        "firstName": first,
        "lastName": last,
        "email": format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
        "mobileNumber": "0400000000",
        "address": null,
    })
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            patch(update_employee).delete(delete_employee),
        )
        .route("/contracts", get(list_contracts).post(create_contract))
        .route("/contracts/{id}", patch(update_contract).delete(delete_contract))
        .with_state(state)
}

fn record_tenant(state: &mut BackendState, headers: &HeaderMap) {
    state.last_tenant = headers
        .get("x-tenant")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
}

fn take_rejection(state: &mut BackendState) -> Option<Response> {
    state
        .reject_next
        .take()
        .map(|(status, body)| (status, Json(body)).into_response())
}

fn not_found(noun: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("{noun} not found") })),
    )
        .into_response()
}

async fn list_employees(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().expect("state");
    record_tenant(&mut state, &headers);
    state.employee_queries.push(params.clone());
    if let Some(body) = state.list_override.clone() {
        return Json(body).into_response();
    }
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let size: usize = params.get("size").and_then(|s| s.parse().ok()).unwrap_or(10);
    let needle = params.get("searchText").map(|text| text.to_lowercase());
    let rows: Vec<Value> = state
        .employees
        .iter()
        .filter(|employee| match &needle {
            Some(needle) => format!("{} {}", employee["firstName"], employee["lastName"])
                .replace('"', "")
                .to_lowercase()
                .contains(needle),
            None => true,
        })
        .skip((page.max(1) - 1) * size)
        .take(size)
        .cloned()
        .collect();
    Json(Value::Array(rows)).into_response()
}

async fn create_employee(State(state): State<Shared>, Json(mut body): Json<Value>) -> Response {
    let mut state = state.lock().expect("state");
    if let Some(rejection) = take_rejection(&mut state) {
        return rejection;
    }
    state.mutations += 1;
    state.next_id += 1;
    body["id"] = json!(state.next_id);
    state.employees.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_employee(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("state");
    if let Some(rejection) = take_rejection(&mut state) {
        return rejection;
    }
    state.mutations += 1;
    body["id"] = json!(id);
    match state.employees.iter_mut().find(|e| e["id"] == json!(id)) {
        Some(slot) => {
            *slot = body.clone();
            Json(body).into_response()
        }
        None => not_found("Employee"),
    }
}

async fn delete_employee(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut state = state.lock().expect("state");
    if let Some(rejection) = take_rejection(&mut state) {
        return rejection;
    }
    state.mutations += 1;
    let before = state.employees.len();
    state.employees.retain(|e| e["id"] != json!(id));
    if state.employees.len() == before {
        return not_found("Employee");
    }
    state.contracts.retain(|c| c["employeeId"] != json!(id));
    StatusCode::NO_CONTENT.into_response()
}

async fn list_contracts(State(state): State<Shared>) -> Response {
    let state = state.lock().expect("state");
    Json(Value::Array(state.contracts.clone())).into_response()
}

async fn create_contract(State(state): State<Shared>, Json(mut body): Json<Value>) -> Response {
    let mut state = state.lock().expect("state");
    if let Some(rejection) = take_rejection(&mut state) {
        return rejection;
    }
    state.mutations += 1;
    state.next_id += 1;
    body["id"] = json!(state.next_id);
    state.contracts.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_contract(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("state");
    state.mutations += 1;
    body["id"] = json!(id);
    match state.contracts.iter_mut().find(|c| c["id"] == json!(id)) {
        Some(slot) => {
            *slot = body.clone();
            Json(body).into_response()
        }
        None => not_found("Contract"),
    }
}

async fn delete_contract(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut state = state.lock().expect("state");
    state.mutations += 1;
    let before = state.contracts.len();
    state.contracts.retain(|c| c["id"] != json!(id));
    if state.contracts.len() == before {
        return not_found("Contract");
    }
    StatusCode::NO_CONTENT.into_response()
}
