use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skiff_api::config::ServerConfig;
use skiff_api::router::build_app_router;
use skiff_api::sessions::SessionStore;
use skiff_api::{background, state};

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skiff_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    prepare_data_dirs(&config).await;

    if config.bootstrap_ip.is_none() && config.bootstrap_token.is_none() {
        tracing::warn!(
            "Neither INIT_ALLOWED_IP nor INIT_AUTH_TOKEN is set; only the \
             allow-list and token files can grant access"
        );
    }

    // --- Database ---
    let pool = skiff_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    skiff_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    skiff_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- App state ---
    let config = Arc::new(config);
    let state = AppState {
        pool: pool.clone(),
        config: Arc::clone(&config),
        sessions: SessionStore::new(config.session_lifetime_days),
    };

    // --- Retention sweeper ---
    let sweep_cancel = tokio_util::sync::CancellationToken::new();
    let sweep_handle = tokio::spawn(background::retention::run(
        pool,
        Arc::clone(&config),
        sweep_cancel.clone(),
    ));

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweep_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    tracing::info!("Retention sweeper stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Create the data directories and credential files the service expects.
///
/// The uploads tree, the parent directories of both credential files and
/// of a file-backed SQLite database, and empty credential files are all
/// created when missing so a fresh deployment starts from a usable state.
async fn prepare_data_dirs(config: &ServerConfig) {
    tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .expect("Failed to create uploads directory");

    if let Some(db_path) = config.database_url.strip_prefix("sqlite://") {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .expect("Failed to create database directory");
            }
        }
    }

    for file in [&config.allowed_ips_file, &config.tokens_file] {
        if let Some(parent) = file.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .expect("Failed to create credentials directory");
            }
        }
        if tokio::fs::metadata(file).await.is_err() {
            tokio::fs::write(file, b"")
                .await
                .expect("Failed to create credentials file");
            tracing::info!(file = %file.display(), "Created empty credentials file");
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
