//! Public share-link downloads and authenticated downloads by id.

use std::path::Path as FsPath;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use axum_extra::extract::CookieJar;
use chrono::Utc;
use tokio_util::io::ReaderStream;

use skiff_core::error::CoreError;
use skiff_core::share_link;
use skiff_core::types::DbId;
use skiff_db::models::share_token::ShareToken;
use skiff_db::repositories::ShareTokenRepo;

use crate::error::{AppError, AppResult};
use crate::sessions::SESSION_COOKIE;
use crate::state::AppState;

/// GET /d/{token}
///
/// Anonymous download through a share link. Unknown and expired tokens
/// both end in 404; the two cases get distinct messages but neither
/// reveals whether the underlying file exists.
pub async fn download_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Response> {
    let Some(record) = ShareTokenRepo::find_by_token(&state.pool, &token).await? else {
        return Err(AppError::Core(CoreError::NotFound(
            "File not found or link has expired".into(),
        )));
    };

    if share_link::is_expired(record.expires_at, Utc::now()) {
        tracing::debug!(token_id = record.id, "Expired share link used");
        return Err(AppError::Core(CoreError::NotFound(
            "Download link has expired".into(),
        )));
    }

    stream_file(&state, &record).await
}

/// GET /download/{file_id}
///
/// Download by registry id, restricted to the session that uploaded the
/// file. Any failure before the stream starts is a plain 401 so the
/// endpoint discloses nothing about which ids exist.
pub async fn download_by_id(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(file_id): Path<DbId>,
) -> AppResult<Response> {
    let unauthorized = || AppError::Core(CoreError::Unauthorized("Unauthorized".into()));

    let sid = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(unauthorized)?;
    if state.sessions.get(&sid).await.is_none() {
        return Err(unauthorized());
    }

    let record = ShareTokenRepo::find_by_id(&state.pool, file_id)
        .await?
        .ok_or_else(unauthorized)?;
    if record.session_id != sid {
        tracing::warn!(session = %sid, file_id, "Cross-session download attempt");
        return Err(unauthorized());
    }

    stream_file(&state, &record).await
}

/// Stream the file behind a registry record as an attachment.
async fn stream_file(state: &AppState, record: &ShareToken) -> AppResult<Response> {
    let path = state
        .config
        .uploads_dir
        .join(&record.dir_name)
        .join(&record.file_name);

    let file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // Registry row outlived the file (manual deletion, sweep race).
            return Err(AppError::Core(CoreError::NotFound(
                "File not found or link has expired".into(),
            )));
        }
        Err(e) => {
            return Err(AppError::InternalError(format!(
                "cannot open {}: {e}",
                path.display()
            )));
        }
    };

    let len = file
        .metadata()
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .len();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&len.to_string())
            .map_err(|e| AppError::InternalError(e.to_string()))?,
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&record.file_name))
            .map_err(|e| AppError::InternalError(e.to_string()))?,
    );

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    response.headers_mut().extend(headers);

    tracing::debug!(file = %FsPath::new(&record.file_name).display(), len, "Streaming download");
    Ok(response)
}

/// Build a `Content-Disposition: attachment` header value that survives
/// non-ASCII filenames. The plain `filename` parameter carries an ASCII
/// approximation and `filename*` carries the RFC 5987 UTF-8 form.
pub fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && c != '"' && c != '\\' && !c.is_ascii_control() {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(*byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }

    format!("attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
