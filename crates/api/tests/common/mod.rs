#![allow(dead_code)]

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use gxq_api::config::ServerConfig;
use gxq_api::router::build_app_router;
use gxq_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults pointing at `scripts_dir`.
///
/// Uses `http://localhost:3000` as CORS origin (matching the dev default)
/// and a one-second script timeout so timeout tests stay fast.
pub fn test_config(scripts_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        scripts_dir: scripts_dir.to_path_buf(),
        script_interpreter: "bash".to_string(),
        script_timeout_secs: 1,
        script_max_output_bytes: 10 * 1024 * 1024,
    }
}

/// Build the full application router with all middleware layers.
///
/// Goes through [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app(scripts_dir: &Path) -> Router {
    build_app_router(AppState::new(test_config(scripts_dir)))
}

/// Same as [`build_test_app`] with a custom config.
pub fn build_test_app_with(config: ServerConfig) -> Router {
    build_app_router(AppState::new(config))
}

/// Create a scratch scripts directory containing the given `(filename, body)` pairs.
pub fn scripts_dir(scripts: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (name, body) in scripts {
        std::fs::write(dir.path().join(name), format!("#!/bin/bash\n{body}")).expect("write script");
    }
    dir
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

/// Send a POST request with a raw body and a JSON content type.
pub async fn post_raw(app: Router, uri: &str, body: impl Into<String>) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}
