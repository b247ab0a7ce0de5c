//! Periodic cleanup of aged uploads.
//!
//! Walks the per-session uploads tree on a fixed interval, deletes files
//! older than the configured lifetime together with their share-token
//! records, and prunes session directories left empty. Runs on
//! `tokio::time::interval` until cancelled.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use skiff_core::types::Timestamp;
use skiff_db::repositories::ShareTokenRepo;
use skiff_db::DbPool;

use crate::config::ServerConfig;

/// Outcome of one sweep over the uploads tree.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub files_deleted: u64,
    pub records_deleted: u64,
    pub dirs_removed: u64,
}

impl SweepStats {
    pub fn is_empty(&self) -> bool {
        *self == SweepStats::default()
    }
}

/// Run the retention sweep loop until `cancel` is triggered.
///
/// A non-positive file lifetime disables retention entirely.
pub async fn run(pool: DbPool, config: Arc<ServerConfig>, cancel: CancellationToken) {
    let lifetime_days = config.uploaded_files_lifetime_days;
    if lifetime_days <= 0 {
        tracing::info!("File retention disabled, sweep job not starting");
        return;
    }

    tracing::info!(
        lifetime_days,
        interval_secs = config.cleanup_interval_secs,
        "File retention job started"
    );

    let lifetime = chrono::Duration::days(lifetime_days);
    let mut interval = tokio::time::interval(Duration::from_secs(config.cleanup_interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("File retention job stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_once(&pool, &config.uploads_dir, lifetime, Utc::now()).await {
                    Ok(stats) if stats.is_empty() => {
                        tracing::debug!("File retention: nothing to purge");
                    }
                    Ok(stats) => {
                        tracing::info!(
                            files = stats.files_deleted,
                            records = stats.records_deleted,
                            dirs = stats.dirs_removed,
                            "File retention: purged aged uploads"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "File retention: sweep failed");
                    }
                }
            }
        }
    }
}

/// Sweep the uploads tree once, deleting files whose age at `now`
/// reaches `lifetime`.
///
/// Each deleted file also drops its share-token record, keyed by the
/// session directory name. A directory left empty after deletions is
/// removed. Failures on individual entries are logged and skipped so one
/// bad file cannot stall the whole sweep; a missing uploads root is a
/// no-op.
pub async fn sweep_once(
    pool: &DbPool,
    uploads_root: &Path,
    lifetime: chrono::Duration,
    now: Timestamp,
) -> std::io::Result<SweepStats> {
    let mut stats = SweepStats::default();

    let mut sessions = match tokio::fs::read_dir(uploads_root).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(stats),
        Err(e) => return Err(e),
    };

    while let Some(session_dir) = sessions.next_entry().await? {
        let dir_path = session_dir.path();
        if !dir_path.is_dir() {
            continue;
        }
        let session_id = session_dir.file_name().to_string_lossy().into_owned();

        let mut entries = match tokio::fs::read_dir(&dir_path).await {
            Ok(rd) => rd,
            Err(e) => {
                tracing::warn!(dir = %dir_path.display(), error = %e, "Cannot read session directory, skipping");
                continue;
            }
        };

        let mut remaining = 0u64;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(mtime) = entry
                .metadata()
                .await
                .ok()
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from)
            else {
                remaining += 1;
                continue;
            };

            // A file aged exactly one lifetime is kept; deletion starts
            // strictly past it.
            if now - mtime <= lifetime {
                remaining += 1;
                continue;
            }

            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!(file = %path.display(), error = %e, "Cannot delete aged file, skipping");
                remaining += 1;
                continue;
            }
            stats.files_deleted += 1;

            let file_name = entry.file_name().to_string_lossy().into_owned();
            match ShareTokenRepo::delete_by_session_and_name(pool, &session_id, &file_name).await {
                Ok(true) => stats.records_deleted += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        session = %session_id,
                        file = %file_name,
                        error = %e,
                        "Cannot delete share record for swept file"
                    );
                }
            }
        }

        if remaining == 0 {
            match tokio::fs::remove_dir(&dir_path).await {
                Ok(()) => stats.dirs_removed += 1,
                Err(e) => {
                    tracing::debug!(dir = %dir_path.display(), error = %e, "Empty directory not removed");
                }
            }
        }
    }

    Ok(stats)
}
