//! Shared helpers for HTTP-level integration tests.
//!
//! [`build_test_app`] mirrors the router construction in `main.rs` so the
//! tests exercise the same middleware stack (access gate, capacity guard,
//! CORS, request ID, timeout, panic recovery) that production uses. Each
//! test gets its own data directory via `tempfile` and its own SQLite
//! pool via `#[sqlx::test]`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::util::ServiceExt;

use skiff_api::config::ServerConfig;
use skiff_api::router::build_app_router;
use skiff_api::sessions::SessionStore;
use skiff_api::state::AppState;

/// An IP that is neither loopback nor on any allow-list a test writes.
pub const STRANGER_IP: &str = "198.51.100.23";

/// An IP that tests put on the allow-list.
pub const TRUSTED_IP: &str = "10.0.0.5";

/// Build a test `ServerConfig` rooted at `data_dir`.
///
/// Both credential files exist and are empty, matching the state
/// `main.rs` prepares on first startup.
pub fn test_config(data_dir: &Path) -> ServerConfig {
    let allowed_ips_file = data_dir.join("allowed_ip_addresses.txt");
    let tokens_file = data_dir.join("tokens.txt");
    let uploads_dir = data_dir.join("uploads");
    std::fs::write(&allowed_ips_file, "").expect("seed allow-list file");
    std::fs::write(&tokens_file, "").expect("seed tokens file");
    std::fs::create_dir_all(&uploads_dir).expect("seed uploads directory");

    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        allowed_ips_file,
        tokens_file,
        uploads_dir,
        bootstrap_ip: None,
        bootstrap_token: None,
        session_lifetime_days: 7,
        uploaded_files_lifetime_days: 7,
        download_token_lifetime_days: 1,
        max_storage_capacity: skiff_core::quota::DEFAULT_MAX_CAPACITY_BYTES,
        cleanup_interval_secs: 3600,
    }
}

/// Build the full application router over the given pool and config.
pub fn build_test_app(pool: SqlitePool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        sessions: SessionStore::new(config.session_lifetime_days),
    };
    build_app_router(state, &config)
}

/// Put `ip` on the allow-list file of `config`.
pub fn allow_ip(config: &ServerConfig, ip: &str) {
    std::fs::write(&config.allowed_ips_file, format!("{ip}\n")).expect("write allow-list");
}

/// Put `token` in the tokens file of `config`.
pub fn allow_token(config: &ServerConfig, token: &str) {
    std::fs::write(&config.tokens_file, format!("{token}\n")).expect("write tokens file");
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

fn base_request(method: Method, path: &str, ip: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header("x-forwarded-for", ip);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
}

/// Send a GET request as `ip`, optionally with a session cookie.
pub async fn get(app: Router, path: &str, ip: &str, cookie: Option<&str>) -> Response<Body> {
    let request = base_request(Method::GET, path, ip, cookie)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST with a JSON body.
pub async fn post_json(
    app: Router,
    path: &str,
    ip: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let request = base_request(Method::POST, path, ip, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST with an empty body.
pub async fn post_empty(app: Router, path: &str, ip: &str, cookie: Option<&str>) -> Response<Body> {
    let request = base_request(Method::POST, path, ip, cookie)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a multipart POST carrying one `file` field per `(name, bytes)`
/// pair. The Content-Length header is set explicitly since nothing else
/// in the oneshot path adds it, and the capacity guard reads it.
pub async fn post_multipart(
    app: Router,
    path: &str,
    ip: &str,
    cookie: Option<&str>,
    files: &[(&str, &[u8])],
) -> Response<Body> {
    let boundary = "skiff-test-boundary";
    let mut body: Vec<u8> = Vec::new();
    for (name, data) in files {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\n\
                 Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    let request = base_request(Method::POST, path, ip, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Parse the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body must be JSON")
}

/// Collect the raw response body.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("read response body")
        .to_bytes()
        .to_vec()
}

/// Extract the `name=value` pair of the session cookie, suitable for a
/// `Cookie` request header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}

/// Authenticate as an allow-listed IP and return the session cookie.
pub async fn ip_session(app: Router, config: &ServerConfig) -> String {
    allow_ip(config, TRUSTED_IP);
    let response = get(app, "/api/user-files", TRUSTED_IP, None).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    session_cookie(&response).expect("IP auth must set a session cookie")
}

/// Path of a stored upload inside the test data directory.
pub fn stored_path(config: &ServerConfig, dir: &str, name: &str) -> PathBuf {
    config.uploads_dir.join(dir).join(name)
}
