use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status: "ok" only when every check passes.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the uploads tree exists and is a directory.
    pub uploads_dir_ok: bool,
}

/// GET /health -- service, database, and storage health.
///
/// The service can limp along with a missing uploads tree (uploads fail,
/// downloads 404) so that degrades the status instead of erroring.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = skiff_db::health_check(&state.pool).await.is_ok();

    let uploads_dir_ok = tokio::fs::metadata(&state.config.uploads_dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let status = if db_healthy && uploads_dir_ok {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        uploads_dir_ok,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
