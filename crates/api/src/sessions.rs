//! In-memory authenticated-session store.
//!
//! A session is created only on successful authorization (IP match or
//! valid token submission), so every stored session is authenticated.
//! The session id doubles as the user's upload directory name, which is
//! the sole namespace isolating one user's files from another's.
//!
//! Sessions expire after the configured lifetime and are evicted lazily
//! on lookup.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use skiff_core::types::Timestamp;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "skiff_sid";

/// How a session was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Caller's IP was on the allow-list (or was loopback/bootstrap).
    Ip,
    /// Caller submitted a valid access token.
    Token,
}

impl AuthMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthMethod::Ip => "ip",
            AuthMethod::Token => "token",
        }
    }
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    pub authed_by: AuthMethod,
    /// Uploads subdirectory owned by this session (= session id).
    pub upload_dir: String,
    pub created_at: Timestamp,
}

/// Shared map of session id to session, with lazy expiry.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new(lifetime_days: i64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            lifetime: Duration::days(lifetime_days),
        }
    }

    /// Look up a session by id, evicting it if past its lifetime.
    pub async fn get(&self, id: &str) -> Option<Session> {
        {
            let sessions = self.inner.read().await;
            match sessions.get(id) {
                Some(s) if s.created_at + self.lifetime > Utc::now() => return Some(s.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.inner.write().await.remove(id);
        None
    }

    /// Create a new authenticated session, returning its id.
    pub async fn create(&self, authed_by: AuthMethod) -> (String, Session) {
        let id = Uuid::new_v4().to_string();
        let session = Session {
            authed_by,
            upload_dir: id.clone(),
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .insert(id.clone(), session.clone());
        (id, session)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
