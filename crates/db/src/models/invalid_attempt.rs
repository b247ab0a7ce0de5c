//! Brute-force throttle tracking model.

use sqlx::FromRow;

use skiff_core::types::Timestamp;

/// Invalid token submissions tracked for one source IP.
#[derive(Debug, Clone, FromRow)]
pub struct InvalidAttempt {
    pub ip: String,
    pub attempts: i64,
    pub last_attempt_at: Timestamp,
}
