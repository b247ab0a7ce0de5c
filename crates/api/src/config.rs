use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3333`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// SQLite database URL.
    pub database_url: String,
    /// Newline-delimited allow-list of IP addresses exempt from token auth.
    pub allowed_ips_file: PathBuf,
    /// Newline-delimited list of valid access tokens.
    pub tokens_file: PathBuf,
    /// Root of the per-session uploads tree.
    pub uploads_dir: PathBuf,
    /// Bootstrap IP granted access before the allow-list file has content.
    pub bootstrap_ip: Option<String>,
    /// Bootstrap token accepted while the tokens file is empty.
    pub bootstrap_token: Option<String>,
    /// Lifetime of an authenticated session, in days.
    pub session_lifetime_days: i64,
    /// Age at which the retention sweeper deletes uploaded files, in days.
    pub uploaded_files_lifetime_days: i64,
    /// Lifetime of a share token from issue/refresh, in days.
    pub download_token_lifetime_days: i64,
    /// Maximum aggregate size of the uploads tree, in bytes.
    pub max_storage_capacity: u64,
    /// Interval between retention sweeps, in seconds.
    pub cleanup_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                           |
    /// |---------------------------------|-----------------------------------|
    /// | `HOST`                          | `0.0.0.0`                         |
    /// | `PORT`                          | `3333`                            |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173`           |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                              |
    /// | `DATABASE_URL`                  | `sqlite://db-data/app.db`         |
    /// | `ALLOWED_IPS_FILE_PATH`         | `db-data/allowed_ip_addresses.txt`|
    /// | `TOKENS_FILE_PATH`              | `db-data/tokens.txt`              |
    /// | `UPLOADS_DIR`                   | `uploads`                         |
    /// | `INIT_ALLOWED_IP`               | unset                             |
    /// | `INIT_AUTH_TOKEN`               | unset                             |
    /// | `SESSION_LIFETIME_DAYS`         | `7`                               |
    /// | `UPLOADED_FILES_LIFETIME_DAYS`  | `7`                               |
    /// | `DOWNLOAD_TOKEN_LIFETIME_DAYS`  | `1`                               |
    /// | `UPLOADS_STORAGE_MAX_CAPACITY`  | `107374182400` (100 GiB)          |
    /// | `CLEANUP_INTERVAL_SECS`         | `3600`                            |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3333".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://db-data/app.db".into());

        let allowed_ips_file = PathBuf::from(
            std::env::var("ALLOWED_IPS_FILE_PATH")
                .unwrap_or_else(|_| "db-data/allowed_ip_addresses.txt".into()),
        );

        let tokens_file = PathBuf::from(
            std::env::var("TOKENS_FILE_PATH").unwrap_or_else(|_| "db-data/tokens.txt".into()),
        );

        let uploads_dir =
            PathBuf::from(std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".into()));

        let bootstrap_ip = std::env::var("INIT_ALLOWED_IP")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let bootstrap_token = std::env::var("INIT_AUTH_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let session_lifetime_days: i64 = std::env::var("SESSION_LIFETIME_DAYS")
            .unwrap_or_else(|_| "7".into())
            .parse()
            .expect("SESSION_LIFETIME_DAYS must be a valid i64");

        let uploaded_files_lifetime_days: i64 = std::env::var("UPLOADED_FILES_LIFETIME_DAYS")
            .unwrap_or_else(|_| "7".into())
            .parse()
            .expect("UPLOADED_FILES_LIFETIME_DAYS must be a valid i64");

        let download_token_lifetime_days: i64 = std::env::var("DOWNLOAD_TOKEN_LIFETIME_DAYS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("DOWNLOAD_TOKEN_LIFETIME_DAYS must be a valid i64");

        let max_storage_capacity: u64 = std::env::var("UPLOADS_STORAGE_MAX_CAPACITY")
            .map(|v| {
                v.parse()
                    .expect("UPLOADS_STORAGE_MAX_CAPACITY must be a valid u64")
            })
            .unwrap_or(skiff_core::quota::DEFAULT_MAX_CAPACITY_BYTES);

        let cleanup_interval_secs: u64 = std::env::var("CLEANUP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("CLEANUP_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            allowed_ips_file,
            tokens_file,
            uploads_dir,
            bootstrap_ip,
            bootstrap_token,
            session_lifetime_days,
            uploaded_files_lifetime_days,
            download_token_lifetime_days,
            max_storage_capacity,
            cleanup_interval_secs,
        }
    }
}
