//! Website-settings endpoints: read/write the credential lists.
//!
//! Only IP-authenticated sessions may touch credentials; a session that
//! authenticated with a shared token must not be able to mint tokens or
//! widen the allow-list.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use skiff_core::credentials::CredentialStore;
use skiff_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::sessions::AuthMethod;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct WebsiteSettings {
    pub allowed_ip_addresses: Vec<String>,
    pub access_tokens: Vec<String>,
}

fn require_ip_authed(user: &CurrentUser) -> Result<(), AppError> {
    if user.authed_by == AuthMethod::Ip {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Unauthorized(
            "Settings require an IP-authenticated session".into(),
        )))
    }
}

/// GET /api/website-settings
pub async fn get_settings(
    user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<WebsiteSettings>> {
    require_ip_authed(&user)?;

    let allowed_ip_addresses = CredentialStore::new(&state.config.allowed_ips_file).load()?;
    let access_tokens = CredentialStore::new(&state.config.tokens_file).load()?;

    Ok(Json(WebsiteSettings {
        allowed_ip_addresses,
        access_tokens,
    }))
}

/// POST /api/website-settings
pub async fn save_settings(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(input): Json<WebsiteSettings>,
) -> AppResult<StatusCode> {
    require_ip_authed(&user)?;

    CredentialStore::new(&state.config.allowed_ips_file).save(&input.allowed_ip_addresses)?;
    CredentialStore::new(&state.config.tokens_file).save(&input.access_tokens)?;

    tracing::info!(
        allowed_ips = input.allowed_ip_addresses.len(),
        tokens = input.access_tokens.len(),
        "Website settings saved"
    );
    Ok(StatusCode::NO_CONTENT)
}
