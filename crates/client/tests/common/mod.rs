use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{json, Value};

use counsel_client::{ClientConfig, HttpClient, SessionStore};

/// How long the `/slow/` route sleeps before answering.
pub const SLOW_ROUTE_DELAY: Duration = Duration::from_secs(2);

/// Build a small stand-in for the records backend.
///
/// - `GET /whoami/` echoes the `Authorization` and `x-request-id` headers.
/// - `GET|POST /grade-one/` lists or creates (the created id is always 41).
/// - `DELETE /grade-one/{id}/` answers `204`, or `404` for id 0.
/// - `GET /search-student/` filters two fixed candidates by `query`.
/// - `GET /invalid/` answers `400` with a field error body.
/// - `GET /slow/` sleeps for [`SLOW_ROUTE_DELAY`].
pub fn backend() -> Router {
    Router::new()
        .route("/whoami/", get(whoami))
        .route("/grade-one/", get(list_grade_one).post(create_grade_one))
        .route("/grade-one/{id}/", delete(delete_grade_one))
        .route("/search-student/", get(search_student))
        .route("/invalid/", get(invalid))
        .route("/slow/", get(slow))
}

/// Serve [`backend`] on an ephemeral port and return its base URL.
pub async fn spawn_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, backend()).await.expect("serve test backend");
    });
    format!("http://{addr}")
}

/// A client pointed at `api_url` with the given timeout and a fresh
/// in-memory session.
pub fn client(api_url: &str, timeout: Duration) -> HttpClient {
    let config = ClientConfig {
        api_url: api_url.to_string(),
        timeout,
        session_file: None,
        ..Default::default()
    };
    HttpClient::new(&config, SessionStore::in_memory()).expect("build client")
}

async fn whoami(headers: HeaderMap) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "authorization": header("authorization"),
        "request_id": header("x-request-id"),
    }))
}

async fn list_grade_one() -> Json<Value> {
    Json(json!([
        { "id": 1, "sr_code": "SR-001", "name": "Jane Doe" },
        { "id": 2, "sr_code": "SR-002", "name": "John Roe" },
    ]))
}

async fn create_grade_one(Json(mut body): Json<Value>) -> (StatusCode, Json<Value>) {
    body["id"] = json!(41);
    (StatusCode::CREATED, Json(body))
}

async fn delete_grade_one(Path(id): Path<i64>) -> StatusCode {
    if id == 0 {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn search_student(Query(params): Query<std::collections::HashMap<String, String>>) -> Json<Value> {
    let query = params.get("query").cloned().unwrap_or_default();
    let all = [
        json!({ "sr_code": "SR-001", "firstname": "Jane", "lastname": "Doe", "year": "Grade7", "section": "A" }),
        json!({ "sr_code": "SR-002", "firstname": "John", "lastname": "Roe", "year": "Grade 8", "section": "B" }),
    ];
    let hits: Vec<Value> = all
        .into_iter()
        .filter(|c| c["sr_code"].as_str().unwrap_or_default().contains(query.as_str()))
        .collect();
    Json(Value::Array(hits))
}

async fn invalid() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "sr_code": ["This field is required."] })),
    )
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_ROUTE_DELAY).await;
    Json(json!({ "ok": true }))
}
