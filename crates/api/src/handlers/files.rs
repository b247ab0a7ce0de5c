//! Per-session file management: listing, upload, removal.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;

use skiff_core::error::CoreError;
use skiff_core::filename::{decode_legacy_filename, sanitize_file_name};
use skiff_core::share_link;
use skiff_core::types::{DbId, Timestamp};
use skiff_db::models::share_token::IssueShareToken;
use skiff_db::repositories::ShareTokenRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Filesystem facts about one stored file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStat {
    pub name: String,
    pub size: u64,
    pub mtime: Timestamp,
    pub ctime: Timestamp,
    pub is_file: bool,
    pub is_directory: bool,
    /// When the retention sweeper will delete this file, if retention is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_removal: Option<Timestamp>,
}

/// One entry in the user's file grid: filesystem stat plus the share
/// grant, when a registry record exists for the name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFile {
    pub stat: FileStat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_is_expired: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_link: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilesResponse {
    pub files: Vec<UserFile>,
    pub files_days_lifetime: i64,
}

/// One uploaded file in the upload response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: DbId,
    pub file_name: String,
    pub size: u64,
    pub link: String,
    pub token: String,
    pub token_is_expired: bool,
    pub token_expires_at: Timestamp,
    pub mtime: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub files: Vec<UploadedFile>,
}

// ---------------------------------------------------------------------------
// GET /api/user-files
// ---------------------------------------------------------------------------

/// List the caller's uploaded files, newest first, joined with their
/// share grants. A session whose directory does not exist yet gets an
/// empty list.
pub async fn list_user_files(
    user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserFilesResponse>> {
    let lifetime_days = state.config.uploaded_files_lifetime_days;
    let dir = state.config.uploads_dir.join(&user.upload_dir);

    let mut read_dir = match tokio::fs::read_dir(&dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Json(UserFilesResponse {
                files: Vec::new(),
                files_days_lifetime: lifetime_days,
            }));
        }
        Err(e) => {
            return Err(AppError::InternalError(format!(
                "cannot list upload directory: {e}"
            )));
        }
    };

    let mut stats: Vec<FileStat> = Vec::new();
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
    {
        // Entries deleted mid-listing (the sweeper races us) are skipped.
        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        let mtime = system_time_to_utc(meta.modified().ok());
        let ctime = meta
            .created()
            .ok()
            .map(|t| DateTime::<Utc>::from(t))
            .unwrap_or(mtime);

        stats.push(FileStat {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: meta.len(),
            mtime,
            ctime,
            is_file: meta.is_file(),
            is_directory: meta.is_dir(),
            date_of_removal: (lifetime_days > 0).then(|| mtime + Duration::days(lifetime_days)),
        });
    }

    stats.sort_by(|a, b| b.mtime.cmp(&a.mtime));

    let now = Utc::now();
    let mut files = Vec::with_capacity(stats.len());
    for stat in stats {
        let grant =
            ShareTokenRepo::find_by_session_and_name(&state.pool, &user.session_id, &stat.name)
                .await?;
        files.push(match grant {
            Some(record) => UserFile {
                stat,
                id: Some(record.id),
                token: Some(record.token.clone()),
                token_expires_at: Some(record.expires_at),
                token_is_expired: Some(share_link::is_expired(record.expires_at, now)),
                download_link: Some(format!("/d/{}", record.token)),
            },
            None => UserFile {
                stat,
                id: None,
                token: None,
                token_expires_at: None,
                token_is_expired: None,
                download_link: None,
            },
        });
    }

    Ok(Json(UserFilesResponse {
        files,
        files_days_lifetime: lifetime_days,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/upload
// ---------------------------------------------------------------------------

/// Accept a multipart form with one or more `file` fields. Each file is
/// written under the session's upload directory and gets a share token
/// issued (or refreshed, for a re-upload of the same name).
pub async fn upload(
    user: CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let dir = state.config.uploads_dir.join(&user.upload_dir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalError(format!("cannot create upload directory: {e}")))?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue; // ignore unknown fields
        }

        let raw_name = field.file_name().unwrap_or("file").to_string();
        let file_name = sanitize_file_name(&decode_legacy_filename(&raw_name));

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let path = dir.join(&file_name);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::InternalError(format!("cannot store upload: {e}")))?;

        let now = Utc::now();
        let record = ShareTokenRepo::issue(
            &state.pool,
            &IssueShareToken {
                session_id: user.session_id.clone(),
                file_name: file_name.clone(),
                dir_name: user.upload_dir.clone(),
                token: share_link::generate_token(),
                expires_at: share_link::expires_at(now, state.config.download_token_lifetime_days),
            },
        )
        .await?;

        let mtime = tokio::fs::metadata(&path)
            .await
            .ok()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from)
            .unwrap_or(now);

        tracing::info!(
            session = %user.session_id,
            file = %file_name,
            size = data.len(),
            token_id = record.id,
            "File uploaded"
        );

        files.push(UploadedFile {
            id: record.id,
            file_name,
            size: data.len() as u64,
            link: format!("/d/{}", record.token),
            token: record.token,
            token_is_expired: share_link::is_expired(record.expires_at, now),
            token_expires_at: record.expires_at,
            mtime,
        });
    }

    Ok(Json(UploadResponse { files }))
}

// ---------------------------------------------------------------------------
// POST /api/remove-file/{file_id}
// ---------------------------------------------------------------------------

/// Delete one of the caller's files along with its share grant.
///
/// The ownership check runs before anything touches the disk; a record
/// belonging to another session yields 401 without revealing whether the
/// file exists. Removing an already-gone record is a no-op success.
pub async fn remove_file(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(file_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let Some(record) = ShareTokenRepo::find_by_id(&state.pool, file_id).await? else {
        return Ok(Json(json!({ "status": "ok" })));
    };

    if record.dir_name != user.upload_dir {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Unauthorized".into(),
        )));
    }

    let path = state
        .config
        .uploads_dir
        .join(&record.dir_name)
        .join(&record.file_name);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(AppError::InternalError(format!(
                "error deleting file {}: {e}",
                path.display()
            )));
        }
    }

    ShareTokenRepo::delete_by_id(&state.pool, file_id).await?;
    tracing::info!(session = %user.session_id, file = %record.file_name, "File removed");

    Ok(Json(json!({ "status": "ok" })))
}

/// Convert an optional `SystemTime` to UTC, defaulting to now.
fn system_time_to_utc(t: Option<std::time::SystemTime>) -> Timestamp {
    t.map(DateTime::<Utc>::from).unwrap_or_else(Utc::now)
}
