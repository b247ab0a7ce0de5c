//! Storage-capacity guard for the upload route.
//!
//! Runs before the multipart body is consumed: re-walks the uploads tree,
//! adds the declared request size, and rejects with 413 when the
//! configured capacity would be exceeded. A failed scan is fatal for the
//! request — uploads must not proceed with an unknown quota state.
//!
//! Two concurrent uploads may each be admitted against the same scan and
//! jointly overshoot the capacity by their declared sizes; this
//! inexactness is accepted at this scale.

use axum::extract::{Request, State};
use axum::http::header::CONTENT_LENGTH;
use axum::middleware::Next;
use axum::response::Response;

use skiff_core::error::CoreError;
use skiff_core::quota;

use crate::error::AppError;
use crate::state::AppState;

pub async fn storage_capacity_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let declared: u64 = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let root = state.config.uploads_dir.clone();
    let used = tokio::task::spawn_blocking(move || quota::directory_used_size(&root))
        .await
        .map_err(|e| AppError::InternalError(format!("quota scan task failed: {e}")))?
        .or_else(|e| {
            // An uploads root that does not exist yet holds zero bytes.
            if e.kind() == std::io::ErrorKind::NotFound {
                Ok(0)
            } else {
                Err(AppError::Core(CoreError::Internal(format!(
                    "failed to scan uploads directory: {e}"
                ))))
            }
        })?;

    let max = state.config.max_storage_capacity;
    if !quota::admits(used, declared, max) {
        return Err(AppError::Core(CoreError::QuotaExceeded { used, max }));
    }

    Ok(next.run(req).await)
}
