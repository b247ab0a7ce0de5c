pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::middleware::{access_gate, quota};
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /                      authentication status (GET, ungated)
/// /auth                  submit access token (POST, ungated)
/// /website-settings      read/write credential lists (GET, POST)
/// /user-files            list caller's files (GET)
/// /upload                multipart upload (POST, capacity-guarded)
/// /remove-file/{id}      delete a file and its share grant (POST)
/// ```
///
/// The whole tree sits behind the access gate; the gate itself exempts
/// the status probe and the token endpoint.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let upload = Router::new()
        .route("/upload", post(handlers::files::upload))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            quota::storage_capacity_guard,
        ))
        // The capacity guard bounds uploads, not the framework default.
        .layer(DefaultBodyLimit::disable());

    Router::new()
        .route("/", get(handlers::status::authentication_status))
        .route("/auth", post(handlers::auth::submit_token))
        .route(
            "/website-settings",
            get(handlers::settings::get_settings).post(handlers::settings::save_settings),
        )
        .route("/user-files", get(handlers::files::list_user_files))
        .route(
            "/remove-file/{file_id}",
            post(handlers::files::remove_file),
        )
        .merge(upload)
        .layer(middleware::from_fn_with_state(
            state,
            access_gate::access_gate,
        ))
}

/// Routes mounted at the root, outside the gated `/api` tree.
///
/// ```text
/// /d/{token}             anonymous share-link download (GET)
/// /download/{file_id}    owner download by id (GET)
/// ```
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/d/{token}", get(handlers::share::download_by_token))
        .route(
            "/download/{file_id}",
            get(handlers::share::download_by_id),
        )
}
