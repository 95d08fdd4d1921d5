use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Attempts, Echo, FormEcho, Upload, REQUEST_ID};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_reports_query_and_auth_headers() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/2/echo?locale=en&q=a+b&empty=")
                .header(http::header::AUTHORIZATION, "Bearer tok")
                .header(http::header::USER_AGENT, "app/1.0 Sdk/0.1.0")
                .header("Dropbox-API-Select-User", "dbmid:1")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(REQUEST_ID));
    let echo: Echo = body_json(resp).await;
    assert_eq!(
        echo.query,
        vec![
            ("locale".to_string(), "en".to_string()),
            ("q".to_string(), "a b".to_string()),
            ("empty".to_string(), String::new()),
        ]
    );
    assert_eq!(echo.authorization.as_deref(), Some("Bearer tok"));
    assert_eq!(echo.user_agent.as_deref(), Some("app/1.0 Sdk/0.1.0"));
    assert_eq!(echo.select_user.as_deref(), Some("dbmid:1"));
}

#[tokio::test]
async fn echo_without_query_is_empty() {
    let resp = app().oneshot(get("/2/echo")).await.unwrap();
    let echo: Echo = body_json(resp).await;
    assert!(echo.query.is_empty());
    assert!(echo.authorization.is_none());
}

// --- status ---

#[tokio::test]
async fn status_returns_requested_code_with_text_body() {
    let resp = app().oneshot(get("/2/status/400")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.headers().contains_key(REQUEST_ID));
    assert_eq!(body_bytes(resp).await, "status 400");
}

#[tokio::test]
async fn status_passes_retry_after_through() {
    let resp = app()
        .oneshot(get("/2/status/429?retry_after=7"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.headers()["retry-after"], "7");
}

#[tokio::test]
async fn status_without_retry_after_has_no_header() {
    let resp = app().oneshot(get("/2/status/429")).await.unwrap();
    assert!(!resp.headers().contains_key("retry-after"));
}

// --- flaky ---

#[tokio::test]
async fn flaky_fails_then_recovers() {
    use tower::Service;

    let mut app = app().into_service();

    for expected in [StatusCode::SERVICE_UNAVAILABLE, StatusCode::SERVICE_UNAVAILABLE] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(get("/2/flaky/a?failures=2"))
            .await
            .unwrap();
        assert_eq!(resp.status(), expected);
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/2/flaky/a?failures=2"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let attempts: Attempts = body_json(resp).await;
    assert_eq!(attempts.attempts, 3);

    // counters are per key
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/2/flaky/b?failures=1&status=500"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn flaky_rate_limit_sends_zero_retry_after() {
    let resp = app()
        .oneshot(get("/2/flaky/c?failures=1&status=429"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.headers()["retry-after"], "0");
}

// --- route error envelope ---

#[tokio::test]
async fn delete_returns_conflict_envelope() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/2/files/delete")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"][".tag"], "path_lookup");
    assert_eq!(body["user_message"]["locale"], "en");
}

// --- upload ---

#[tokio::test]
async fn upload_counts_body_bytes() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/2/files/upload")
                .header(http::header::AUTHORIZATION, "Bearer up")
                .body("hello world".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let upload: Upload = body_json(resp).await;
    assert_eq!(upload.size, 11);
    assert_eq!(upload.authorization.as_deref(), Some("Bearer up"));
}

// --- form post ---

#[tokio::test]
async fn token_echoes_form_params() {
    let body = "locale=en&grant_type=authorization_code&code=x%2By";
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/oauth2/token")
                .header(
                    http::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded; charset=utf-8",
                )
                .header(http::header::CONTENT_LENGTH, body.len().to_string())
                .body(body.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: FormEcho = body_json(resp).await;
    assert_eq!(echo.params[1], ("grant_type".to_string(), "authorization_code".to_string()));
    assert_eq!(echo.params[2], ("code".to_string(), "x+y".to_string()));
    assert_eq!(echo.content_length, Some(body.len().to_string()));
    assert!(echo.authorization.is_none());
}

#[tokio::test]
async fn token_rejects_non_form_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/oauth2/token")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body("{}".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}
