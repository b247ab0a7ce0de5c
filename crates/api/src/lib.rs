//! HTTP layer of the skiff file-sharing service.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod sessions;
pub mod state;
