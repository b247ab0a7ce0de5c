//! Session-status probe.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::sessions::SESSION_COOKIE;
use crate::state::AppState;

/// GET /api
///
/// Reports how the caller's session was authenticated (`"ip"`,
/// `"token"`, or `null`). Reachable without authentication so the web
/// client can decide whether to show the token form.
pub async fn authentication_status(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Json<serde_json::Value> {
    let authed_by = match jar.get(SESSION_COOKIE) {
        Some(cookie) => state
            .sessions
            .get(cookie.value())
            .await
            .map(|s| s.authed_by.as_str()),
        None => None,
    };
    Json(json!({ "authenticatedBy": authed_by }))
}
