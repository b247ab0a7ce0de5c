use std::sync::Arc;

use crate::config::ServerConfig;
use crate::sessions::SessionStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: skiff_db::DbPool,
    /// Server configuration (paths, capacities, lifetimes).
    pub config: Arc<ServerConfig>,
    /// In-memory authenticated-session store.
    pub sessions: SessionStore,
}
