//! Request-level access control.
//!
//! Every request to the gated API tree passes through [`access_gate`]
//! before any handler runs:
//!
//! 1. A request carrying a live session cookie is allowed.
//! 2. The token-submission endpoint and the status probe are allowed
//!    unconditionally, so unauthenticated clients can authenticate and
//!    can learn their state.
//! 3. A caller whose IP is on the effective allow-list (configured file
//!    contents plus loopback plus the bootstrap IP) gets a fresh
//!    IP-authenticated session.
//! 4. With no allow-list file and no bootstrap IP the deployment cannot
//!    authenticate anyone by address: 500.
//! 5. Everything else: 401.

use std::net::IpAddr;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use skiff_core::credentials::CredentialStore;
use skiff_core::error::CoreError;

use crate::error::AppError;
use crate::middleware::auth::{resolve_client_ip, CurrentUser};
use crate::sessions::{AuthMethod, SESSION_COOKIE};
use crate::state::AppState;

/// Gate middleware; see the module docs for the decision order.
pub async fn access_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Live session.
    if let Some(sid) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        if let Some(session) = state.sessions.get(&sid).await {
            req.extensions_mut().insert(CurrentUser {
                session_id: sid,
                authed_by: session.authed_by,
                upload_dir: session.upload_dir,
            });
            return Ok(next.run(req).await);
        }
    }

    // 2. Endpoints that must remain reachable without authentication.
    if is_exempt(req.uri().path(), req.method()) {
        return Ok(next.run(req).await);
    }

    // 3. IP allow-list.
    let peer = req
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip());
    let ip = resolve_client_ip(req.headers(), peer);

    let allow_list = CredentialStore::new(&state.config.allowed_ips_file).load();
    let list_available = allow_list.is_ok();

    if let Some(ip) = ip {
        if ip_is_allowed(ip, allow_list.as_deref().unwrap_or(&[]), &state.config.bootstrap_ip) {
            let (sid, session) = state.sessions.create(AuthMethod::Ip).await;
            tracing::info!(%ip, session = %sid, "IP-authenticated session created");

            req.extensions_mut().insert(CurrentUser {
                session_id: sid.clone(),
                authed_by: session.authed_by,
                upload_dir: session.upload_dir,
            });
            let response = next.run(req).await;
            return Ok((jar.add(session_cookie(sid)), response).into_response());
        }
    }

    // 4. No allow-list and no bootstrap IP: address authentication is
    //    impossible, which is a deployment error rather than a bad caller.
    if !list_available && state.config.bootstrap_ip.is_none() {
        return Err(AppError::Core(CoreError::Configuration(
            "Authentication is not configured: set INIT_ALLOWED_IP or provide an allow-list file"
                .into(),
        )));
    }

    // 5. Denied.
    Err(AppError::Core(CoreError::Unauthorized("Unauthorized".into())))
}

/// Build the session cookie for a newly authenticated session.
pub fn session_cookie(sid: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, sid))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Paths allowed through the gate without a session. The gate is mounted
/// inside the `/api` subtree, so paths may arrive with or without the
/// prefix depending on how the router is assembled.
fn is_exempt(path: &str, method: &Method) -> bool {
    let p = path.trim_end_matches('/');
    let p = p.strip_prefix("/api").unwrap_or(p);
    matches!(
        (method, p),
        (&Method::POST, "/auth") | (&Method::GET, "")
    )
}

/// Whether `ip` is on the effective allow-list: configured entries,
/// loopback, or the bootstrap IP.
fn ip_is_allowed(ip: IpAddr, allow_list: &[String], bootstrap_ip: &Option<String>) -> bool {
    if ip.is_loopback() {
        return true;
    }
    if let Some(bootstrap) = bootstrap_ip {
        if bootstrap.parse::<IpAddr>() == Ok(ip) {
            return true;
        }
    }
    allow_list
        .iter()
        .any(|entry| entry.parse::<IpAddr>() == Ok(ip))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
