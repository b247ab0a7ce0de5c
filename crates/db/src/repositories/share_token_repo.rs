//! Repository for the `share_tokens` table.

use sqlx::SqlitePool;

use skiff_core::types::{DbId, Timestamp};

use crate::models::share_token::{IssueShareToken, ShareToken};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, session_id, token, file_name, dir_name, expires_at";

/// Provides access to share-token records.
pub struct ShareTokenRepo;

impl ShareTokenRepo {
    /// Issue a share token for `(session_id, file_name)`.
    ///
    /// When a row already exists its `expires_at` is refreshed and the
    /// existing token is returned; otherwise the candidate token from
    /// `input` is inserted. Either way at most one row exists per pair.
    pub async fn issue(pool: &SqlitePool, input: &IssueShareToken) -> Result<ShareToken, sqlx::Error> {
        if let Some(existing) =
            Self::find_by_session_and_name(pool, &input.session_id, &input.file_name).await?
        {
            let query = format!(
                "UPDATE share_tokens SET expires_at = $1 WHERE id = $2 RETURNING {COLUMNS}"
            );
            return sqlx::query_as::<_, ShareToken>(&query)
                .bind(input.expires_at)
                .bind(existing.id)
                .fetch_one(pool)
                .await;
        }

        let query = format!(
            "INSERT INTO share_tokens (session_id, token, file_name, dir_name, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShareToken>(&query)
            .bind(&input.session_id)
            .bind(&input.token)
            .bind(&input.file_name)
            .bind(&input.dir_name)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Resolve a token string to its record, if any.
    pub async fn find_by_token(
        pool: &SqlitePool,
        token: &str,
    ) -> Result<Option<ShareToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM share_tokens WHERE token = $1");
        sqlx::query_as::<_, ShareToken>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<ShareToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM share_tokens WHERE id = $1");
        sqlx::query_as::<_, ShareToken>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_session_and_name(
        pool: &SqlitePool,
        session_id: &str,
        file_name: &str,
    ) -> Result<Option<ShareToken>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM share_tokens WHERE session_id = $1 AND file_name = $2");
        sqlx::query_as::<_, ShareToken>(&query)
            .bind(session_id)
            .bind(file_name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a record by id. Returns `true` if a row was removed.
    pub async fn delete_by_id(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM share_tokens WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the record tied to a swept file, if any. Returns `true` if
    /// a row was removed.
    pub async fn delete_by_session_and_name(
        pool: &SqlitePool,
        session_id: &str,
        file_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM share_tokens WHERE session_id = $1 AND file_name = $2")
                .bind(session_id)
                .bind(file_name)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all rows (test support).
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM share_tokens")
            .fetch_one(pool)
            .await
    }

    /// Force a record's expiry (test support: simulating aged tokens).
    pub async fn set_expires_at(
        pool: &SqlitePool,
        id: DbId,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE share_tokens SET expires_at = $1 WHERE id = $2")
            .bind(expires_at)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
