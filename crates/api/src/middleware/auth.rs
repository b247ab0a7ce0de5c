//! Request-identity extractors for Axum handlers.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use skiff_core::error::CoreError;

use crate::error::AppError;
use crate::sessions::AuthMethod;

/// Authenticated caller, inserted into request extensions by the access
/// gate middleware.
///
/// Use this as an extractor parameter in any handler behind the gate:
///
/// ```ignore
/// async fn my_handler(user: CurrentUser) -> AppResult<Json<()>> {
///     tracing::info!(session = %user.session_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Session identifier (cookie value).
    pub session_id: String,
    /// How the session was authenticated.
    pub authed_by: AuthMethod,
    /// The session's uploads subdirectory.
    pub upload_dir: String,
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unauthorized".into())))
    }
}

/// Source IP of the request, if it can be determined.
///
/// Prefers the first `x-forwarded-for` entry (the service typically sits
/// behind a reverse proxy), falling back to the socket peer address.
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub Option<IpAddr>);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip());
        Ok(ClientIp(resolve_client_ip(&parts.headers, peer)))
    }
}

/// Resolve the effective client IP from headers and the peer address.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .or(peer)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
