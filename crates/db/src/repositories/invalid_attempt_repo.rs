//! Repository for the `invalid_attempts` table.

use sqlx::SqlitePool;

use skiff_core::throttle;
use skiff_core::types::Timestamp;

use crate::models::invalid_attempt::InvalidAttempt;

const COLUMNS: &str = "ip, attempts, last_attempt_at";

/// Tracks failed token submissions per source IP.
pub struct InvalidAttemptRepo;

impl InvalidAttemptRepo {
    pub async fn find_by_ip(
        pool: &SqlitePool,
        ip: &str,
    ) -> Result<Option<InvalidAttempt>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invalid_attempts WHERE ip = $1");
        sqlx::query_as::<_, InvalidAttempt>(&query)
            .bind(ip)
            .fetch_optional(pool)
            .await
    }

    /// Record a failed token submission from `ip` at `now`.
    ///
    /// The counter increments within the throttle window and restarts at
    /// 1 once the previous attempt has aged out.
    pub async fn record_failure(
        pool: &SqlitePool,
        ip: &str,
        now: Timestamp,
    ) -> Result<InvalidAttempt, sqlx::Error> {
        let existing = Self::find_by_ip(pool, ip).await?;
        let attempts = throttle::next_attempt_count(
            existing.map(|a| (a.attempts, a.last_attempt_at)),
            now,
        );

        let query = format!(
            "INSERT INTO invalid_attempts (ip, attempts, last_attempt_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (ip) DO UPDATE SET attempts = $2, last_attempt_at = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InvalidAttempt>(&query)
            .bind(ip)
            .bind(attempts)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Full reset for an IP after a successful authentication.
    /// Returns `true` if a tracked row existed.
    pub async fn clear(pool: &SqlitePool, ip: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invalid_attempts WHERE ip = $1")
            .bind(ip)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
