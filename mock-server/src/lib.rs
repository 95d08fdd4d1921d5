use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const REQUEST_ID: &str = "x-dropbox-request-id";

/// What `/2/echo` saw of the request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
    pub select_user: Option<String>,
}

/// What `/oauth2/token` saw of a form post.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FormEcho {
    pub params: Vec<(String, String)>,
    pub content_type: Option<String>,
    pub content_length: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Upload {
    pub size: usize,
    pub authorization: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Attempts {
    pub attempts: u32,
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub retry_after: Option<String>,
}

#[derive(Deserialize)]
pub struct FlakyQuery {
    pub failures: u32,
    #[serde(default = "default_flaky_status")]
    pub status: u16,
}

fn default_flaky_status() -> u16 {
    503
}

/// Attempts seen so far, keyed by the flaky endpoint's path segment.
pub type Counters = Arc<RwLock<HashMap<String, u32>>>;

pub fn app() -> Router {
    let counters: Counters = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/2/echo", get(echo))
        .route("/2/status/{code}", get(status))
        .route("/2/flaky/{key}", get(flaky))
        .route("/2/files/delete", post(delete_conflict))
        .route("/2/files/upload", put(upload))
        .route("/oauth2/token", post(token))
        .with_state(counters)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn with_request_id(status: StatusCode, body: impl IntoResponse) -> Response {
    let mut response = (status, body).into_response();
    if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID), value);
    }
    response
}

async fn echo(headers: HeaderMap, Query(query): Query<Vec<(String, String)>>) -> Response {
    let echo = Echo {
        query,
        authorization: header(&headers, "authorization"),
        user_agent: header(&headers, "user-agent"),
        select_user: header(&headers, "dropbox-api-select-user"),
    };
    with_request_id(StatusCode::OK, Json(echo))
}

async fn status(Path(code): Path<u16>, Query(query): Query<StatusQuery>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = with_request_id(status, format!("status {code}"));
    if let Some(retry_after) = query.retry_after {
        if let Ok(value) = HeaderValue::from_str(&retry_after) {
            response.headers_mut().insert("retry-after", value);
        }
    }
    response
}

async fn flaky(
    State(counters): State<Counters>,
    Path(key): Path<String>,
    Query(query): Query<FlakyQuery>,
) -> Response {
    let attempts = {
        let mut counters = counters.write().await;
        let seen = counters.entry(key).or_insert(0);
        *seen += 1;
        *seen
    };
    if attempts <= query.failures {
        let status = StatusCode::from_u16(query.status).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
        let mut response = with_request_id(status, format!("attempt {attempts} failed"));
        if status == StatusCode::TOO_MANY_REQUESTS {
            response
                .headers_mut()
                .insert("retry-after", HeaderValue::from_static("0"));
        }
        return response;
    }
    with_request_id(StatusCode::OK, Json(Attempts { attempts }))
}

async fn delete_conflict() -> Response {
    let envelope = serde_json::json!({
        "error_summary": "path_lookup/not_found/",
        "error": {".tag": "path_lookup", "path_lookup": {".tag": "not_found"}},
        "user_message": {"text": "That file does not exist.", "locale": "en"},
    });
    with_request_id(StatusCode::CONFLICT, Json(envelope))
}

async fn upload(headers: HeaderMap, body: Bytes) -> Response {
    let upload = Upload {
        size: body.len(),
        authorization: header(&headers, "authorization"),
    };
    with_request_id(StatusCode::OK, Json(upload))
}

async fn token(headers: HeaderMap, Form(params): Form<Vec<(String, String)>>) -> Response {
    let echo = FormEcho {
        params,
        content_type: header(&headers, "content-type"),
        content_length: header(&headers, "content-length"),
        authorization: header(&headers, "authorization"),
    };
    with_request_id(StatusCode::OK, Json(echo))
}
