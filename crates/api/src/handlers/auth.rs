//! Token-based authentication endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::Deserialize;

use skiff_core::credentials::CredentialStore;
use skiff_core::error::CoreError;
use skiff_core::throttle;
use skiff_db::repositories::InvalidAttemptRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::access_gate::session_cookie;
use crate::middleware::auth::ClientIp;
use crate::sessions::AuthMethod;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub token: String,
}

/// POST /api/auth
///
/// Validates a submitted access token. Throttled per source IP: after
/// [`throttle::MAX_INVALID_ATTEMPTS`] failures within the window the
/// submission is rejected with 429 before the token is even looked at.
pub async fn submit_token(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    jar: CookieJar,
    Json(input): Json<AuthRequest>,
) -> AppResult<impl IntoResponse> {
    let ip_key = ip
        .map(|i| i.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let now = Utc::now();

    if let Some(tracked) = InvalidAttemptRepo::find_by_ip(&state.pool, &ip_key).await? {
        if throttle::is_locked(tracked.attempts, tracked.last_attempt_at, now) {
            return Err(AppError::Core(CoreError::RateLimited));
        }
    }

    // Valid set: tokens file contents, or the bootstrap token while the
    // file is still empty.
    let file_tokens = CredentialStore::new(&state.config.tokens_file)
        .load()
        .unwrap_or_default();
    let valid_tokens: Vec<String> = if file_tokens.is_empty() {
        state.config.bootstrap_token.iter().cloned().collect()
    } else {
        file_tokens
    };

    if valid_tokens.is_empty() {
        return Err(AppError::Core(CoreError::Configuration(
            "Authentication is not properly configured: no access tokens available".into(),
        )));
    }

    if valid_tokens.iter().any(|t| t == &input.token) {
        InvalidAttemptRepo::clear(&state.pool, &ip_key).await?;
        let (sid, _) = state.sessions.create(AuthMethod::Token).await;
        tracing::info!(ip = %ip_key, session = %sid, "Token-authenticated session created");
        Ok((jar.add(session_cookie(sid)), StatusCode::OK))
    } else {
        let tracked = InvalidAttemptRepo::record_failure(&state.pool, &ip_key, now).await?;
        tracing::warn!(ip = %ip_key, attempts = tracked.attempts, "Invalid access token submitted");
        Err(AppError::Core(CoreError::Unauthorized(
            "Invalid token, please contact developer to get a valid token".into(),
        )))
    }
}
