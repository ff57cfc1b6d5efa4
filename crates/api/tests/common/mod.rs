//! Shared harness for api integration tests.
//!
//! Builds the real application router (same middleware stack as `main.rs`)
//! around a fresh in-memory store, optionally pointing the provider client
//! at a wiremock server with millisecond poll delays.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tower::ServiceExt;

use storyreel_api::config::ServerConfig;
use storyreel_api::router::build_app_router;
use storyreel_api::state::AppState;
use storyreel_api::store::SceneStore;
use storyreel_gemini::{GeminiClient, GeminiConfig, PollConfig};

pub const TEST_KEY: &str = "test-key";

/// Build a test `ServerConfig` with safe defaults. The static dir points at
/// the crate's real assets so fallback serving works from the test cwd.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        static_dir: "static".to_string(),
        gemini: None,
    }
}

/// Provider configuration aimed at a wiremock server, with poll delays in
/// milliseconds so video tests finish quickly.
pub fn stub_gemini_config(base_url: &str) -> GeminiConfig {
    let mut config = GeminiConfig::new(TEST_KEY);
    config.base_url = base_url.trim_end_matches('/').to_string();
    config.poll = PollConfig {
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        multiplier: 1.5,
        max_attempts: 50,
    };
    config
}

/// Build the full application router with all middleware layers.
///
/// `gemini: None` simulates a server started without `GEMINI_API_KEY`.
pub fn build_test_app(gemini: Option<GeminiConfig>) -> Router {
    let config = test_config();
    let state = AppState {
        config: Arc::new(config.clone()),
        store: Arc::new(SceneStore::new()),
        gemini: gemini.map(|c| Arc::new(GeminiClient::new(c))),
        tasks: TaskTracker::new(),
        shutdown: CancellationToken::new(),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_empty(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::post(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn patch_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::patch(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body into raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Snapshot helpers
// ---------------------------------------------------------------------------

/// Fetch the current board snapshot (the `data` payload).
pub async fn snapshot(app: &Router) -> serde_json::Value {
    let response = get(app, "/api/v1/storyboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

/// Poll the snapshot until `pred` holds, panicking after five seconds.
/// Background tasks report through the store, so tests wait on the same
/// surface the UI does.
pub async fn wait_until<F>(app: &Router, pred: F) -> serde_json::Value
where
    F: Fn(&serde_json::Value) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let snap = snapshot(app).await;
        if pred(&snap) {
            return snap;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for board condition; last snapshot: {snap}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Run a successful analysis with `items` scene items through the stubbed
/// provider and wait for the board to become ready.
pub async fn analyze_ready(
    app: &Router,
    server: &wiremock::MockServer,
    items: serde_json::Value,
) -> serde_json::Value {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": items.to_string() }] }
            }]
        })))
        .mount(server)
        .await;

    let response = post_json(
        app,
        "/api/v1/storyboard/analyze",
        serde_json::json!({ "transcript": "Hello world. The end." }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    wait_until(app, |snap| snap["phase"] == "ready").await
}

/// One analysis item with distinguishable field values.
pub fn item(n: usize) -> serde_json::Value {
    serde_json::json!({
        "segment": format!("segment {n}"),
        "visualIdea": format!("idea {n}"),
        "imagePrompt": format!("prompt {n}")
    })
}
