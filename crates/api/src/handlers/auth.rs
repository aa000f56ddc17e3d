//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use theatre_core::email::normalize_email;
use theatre_core::error::CoreError;
use theatre_core::types::DbId;
use theatre_db::repositories::{AllowedUserRepo, IdentityRepo, RoleRepo};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub secret: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub roles: Vec<String>,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or secret".into()))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + secret. Only confirmed identities that are still
/// on the allow-list may sign in.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = normalize_email(&input.email);

    let identity = IdentityRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let secret_valid = verify_password(&input.secret, &identity.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !secret_valid {
        tracing::info!(user_id = identity.id, "Login rejected: wrong secret");
        return Err(invalid_credentials());
    }

    if !identity.email_confirmed {
        return Err(AppError::Core(CoreError::Forbidden(
            "Email is not confirmed".into(),
        )));
    }
    if AllowedUserRepo::find_by_email(&state.pool, &email)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Forbidden(
            "Email is not on the allow-list".into(),
        )));
    }

    let roles = RoleRepo::list_for_user(&state.pool, identity.id)
        .await?
        .into_iter()
        .map(|r| r.role)
        .collect();

    let access_token = generate_access_token(identity.id, &identity.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = identity.id, "User logged in");

    Ok(Json(AuthResponse {
        access_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserInfo {
            id: identity.id,
            email: identity.email,
            roles,
        },
    }))
}
