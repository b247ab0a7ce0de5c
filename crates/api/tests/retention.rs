//! Tests for the retention sweeper over a real uploads tree.

use chrono::{Duration, Utc};
use skiff_api::background::retention::{sweep_once, SweepStats};
use skiff_core::share_link;
use skiff_db::models::share_token::IssueShareToken;
use skiff_db::repositories::ShareTokenRepo;
use sqlx::SqlitePool;

/// Lay down `uploads/<session>/<name>` and a matching registry row.
async fn seed_file(
    pool: &SqlitePool,
    root: &std::path::Path,
    session: &str,
    name: &str,
) -> std::path::PathBuf {
    let dir = root.join(session);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, b"data").unwrap();

    ShareTokenRepo::issue(
        pool,
        &IssueShareToken {
            session_id: session.to_string(),
            file_name: name.to_string(),
            dir_name: session.to_string(),
            token: share_link::generate_token(),
            expires_at: share_link::expires_at(Utc::now(), 1),
        },
    )
    .await
    .unwrap();
    path
}

/// Files older than the lifetime go, along with their registry rows and
/// the directory they leave empty.
#[sqlx::test(migrations = "../db/migrations")]
async fn aged_file_is_swept(pool: SqlitePool) {
    let root = tempfile::tempdir().unwrap();
    let path = seed_file(&pool, root.path(), "sess-1", "old.txt").await;

    // A sweep dated a week past the lifetime sees the file as aged.
    let future = Utc::now() + Duration::days(14);
    let stats = sweep_once(&pool, root.path(), Duration::days(7), future)
        .await
        .unwrap();

    assert_eq!(
        stats,
        SweepStats {
            files_deleted: 1,
            records_deleted: 1,
            dirs_removed: 1,
        }
    );
    assert!(!path.exists());
    assert!(!root.path().join("sess-1").exists());
    assert_eq!(ShareTokenRepo::count(&pool).await.unwrap(), 0);
}

/// A fresh file survives the sweep untouched.
#[sqlx::test(migrations = "../db/migrations")]
async fn fresh_file_is_kept(pool: SqlitePool) {
    let root = tempfile::tempdir().unwrap();
    let path = seed_file(&pool, root.path(), "sess-1", "new.txt").await;

    let stats = sweep_once(&pool, root.path(), Duration::days(7), Utc::now())
        .await
        .unwrap();

    assert!(stats.is_empty());
    assert!(path.exists());
    assert_eq!(ShareTokenRepo::count(&pool).await.unwrap(), 1);
}

/// A directory keeping any fresh file is not pruned.
#[sqlx::test(migrations = "../db/migrations")]
async fn mixed_directory_is_partially_swept(pool: SqlitePool) {
    let root = tempfile::tempdir().unwrap();
    let old = seed_file(&pool, root.path(), "sess-1", "old.txt").await;
    let fresh = root.path().join("sess-1").join("fresh.txt");

    // Push fresh.txt's mtime past the sweep instant so only old.txt ages.
    std::fs::write(&fresh, b"fresh").unwrap();
    let fresh_mtime = std::time::SystemTime::now() + std::time::Duration::from_secs(86400 * 30);
    let f = std::fs::File::options().write(true).open(&fresh).unwrap();
    f.set_modified(fresh_mtime).unwrap();

    let future = Utc::now() + Duration::days(8);
    let stats = sweep_once(&pool, root.path(), Duration::days(7), future)
        .await
        .unwrap();

    assert_eq!(stats.files_deleted, 1);
    assert_eq!(stats.dirs_removed, 0);
    assert!(!old.exists());
    assert!(fresh.exists());
}

/// A file aged exactly one lifetime survives; one second older goes.
#[sqlx::test(migrations = "../db/migrations")]
async fn lifetime_boundary_keeps_the_file(pool: SqlitePool) {
    let root = tempfile::tempdir().unwrap();
    let path = seed_file(&pool, root.path(), "sess-1", "edge.txt").await;

    // Pin the mtime to a whole second so the sweep instant can hit the
    // boundary exactly.
    let mtime_sys = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
    let f = std::fs::File::options().write(true).open(&path).unwrap();
    f.set_modified(mtime_sys).unwrap();
    let mtime: chrono::DateTime<Utc> = mtime_sys.into();
    let lifetime = Duration::days(7);

    let stats = sweep_once(&pool, root.path(), lifetime, mtime + lifetime)
        .await
        .unwrap();
    assert!(stats.is_empty());
    assert!(path.exists());

    let stats = sweep_once(
        &pool,
        root.path(),
        lifetime,
        mtime + lifetime + Duration::seconds(1),
    )
    .await
    .unwrap();
    assert_eq!(stats.files_deleted, 1);
    assert!(!path.exists());
}

/// A missing uploads root is a quiet no-op.
#[sqlx::test(migrations = "../db/migrations")]
async fn missing_root_is_a_noop(pool: SqlitePool) {
    let root = tempfile::tempdir().unwrap();
    let stats = sweep_once(
        &pool,
        &root.path().join("never-created"),
        Duration::days(7),
        Utc::now(),
    )
    .await
    .unwrap();
    assert!(stats.is_empty());
}

/// A swept file without a registry row still gets deleted.
#[sqlx::test(migrations = "../db/migrations")]
async fn unregistered_file_is_still_swept(pool: SqlitePool) {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("sess-2");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("orphan.txt"), b"orphan").unwrap();

    let future = Utc::now() + Duration::days(14);
    let stats = sweep_once(&pool, root.path(), Duration::days(7), future)
        .await
        .unwrap();

    assert_eq!(stats.files_deleted, 1);
    assert_eq!(stats.records_deleted, 0);
    assert_eq!(stats.dirs_removed, 1);
}
