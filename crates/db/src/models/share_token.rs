//! Share-token model and DTOs.

use sqlx::FromRow;

use skiff_core::types::{DbId, Timestamp};

/// A share-token row from the `share_tokens` table.
///
/// Grants unauthenticated download access to one file until `expires_at`.
/// At most one row exists per `(session_id, file_name)` pair.
#[derive(Debug, Clone, FromRow)]
pub struct ShareToken {
    pub id: DbId,
    pub session_id: String,
    pub token: String,
    pub file_name: String,
    pub dir_name: String,
    pub expires_at: Timestamp,
}

/// DTO for issuing (or refreshing) a share token.
///
/// `token` is a candidate: it is only stored when no row exists yet for
/// the `(session_id, file_name)` pair; a refresh keeps the old token and
/// only advances `expires_at`.
pub struct IssueShareToken {
    pub session_id: String,
    pub file_name: String,
    pub dir_name: String,
    pub token: String,
    pub expires_at: Timestamp,
}
