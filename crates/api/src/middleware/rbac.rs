//! Role-based access control extractors.
//!
//! Admin status is looked up in `user_roles` on every request; nothing the
//! client sends can grant it. A failed lookup is logged and treated as "not
//! an admin".

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use theatre_core::error::CoreError;
use theatre_core::policy::Caller;
use theatre_core::roles::AppRole;
use theatre_db::repositories::{IdentityRepo, RoleRepo};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Any authenticated user whose identity still exists.
///
/// ```ignore
/// async fn list(RequireAuth(caller): RequireAuth) -> AppResult<Json<()>> {
///     tracing::info!(user_id = caller.user_id, is_admin = caller.is_admin, "listing");
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAuth(pub Caller);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let caller = resolve_caller(state, &user).await?;
        Ok(RequireAuth(caller))
    }
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     // admin.is_admin is guaranteed to be true here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub Caller);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(caller) = RequireAuth::from_request_parts(parts, state).await?;
        if !caller.is_admin {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(caller))
    }
}

/// Turn a token identity into a [`Caller`] with server-side admin status.
///
/// Tokens outliving a removed identity are rejected with 401.
async fn resolve_caller(state: &AppState, user: &AuthUser) -> Result<Caller, AppError> {
    if IdentityRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Account no longer exists".into(),
        )));
    }

    let is_admin = match RoleRepo::has_role(&state.pool, user.user_id, AppRole::Admin).await {
        Ok(is_admin) => is_admin,
        Err(e) => {
            tracing::warn!(user_id = user.user_id, error = %e, "Role lookup failed, denying admin");
            false
        }
    };

    Ok(Caller::new(user.user_id, is_admin))
}
