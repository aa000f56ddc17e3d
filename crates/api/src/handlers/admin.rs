//! Handlers for the `/admin/users` resource.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use theatre_core::error::CoreError;
use theatre_core::policy::{authorize, Operation, Table};
use theatre_core::provisioning::{self, ProvisionInput, ProvisionStage};
use theatre_core::roles::AppRole;
use theatre_core::types::DbId;
use theatre_db::models::allowed_user::AllowedUserOverview;
use theatre_db::models::role::UserRole;
use theatre_db::repositories::provisioning_repo::NewAccount;
use theatre_db::repositories::{AllowedUserRepo, IdentityRepo, ProvisioningRepo, RoleRepo};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{DataResponse, SuccessResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
///
/// Every field is optional at the wire level so that missing values are
/// reported as validation errors rather than body rejections.
#[derive(Debug, Default, Deserialize)]
pub struct ProvisionUserRequest {
    pub email: Option<String>,
    pub secret: Option<String>,
    pub role: Option<String>,
}

/// Request body for `PUT /admin/users/{id}/roles`.
#[derive(Debug, Deserialize)]
pub struct GrantRoleRequest {
    pub role: AppRole,
}

// ---------------------------------------------------------------------------
// Provisioning
// ---------------------------------------------------------------------------

/// Logs each stage transition of one provisioning request.
struct ProvisionTrace {
    stage: ProvisionStage,
}

impl ProvisionTrace {
    fn start() -> Self {
        tracing::debug!(stage = %ProvisionStage::Pending, "Provisioning request received");
        Self {
            stage: ProvisionStage::Pending,
        }
    }

    fn advance(&mut self, next: ProvisionStage) {
        if next.is_terminal() && next != ProvisionStage::Committed {
            tracing::warn!(from = %self.stage, stage = %next, "Provisioning stopped");
        } else {
            tracing::info!(from = %self.stage, stage = %next, "Provisioning advanced");
        }
        self.stage = next;
    }

    /// Record a rejection and pass the error through.
    fn reject(&mut self, err: impl Into<AppError>) -> AppError {
        self.advance(ProvisionStage::Rejected);
        err.into()
    }

    /// Record a failure after validation and pass the error through.
    fn fail(&mut self, err: impl Into<AppError>) -> AppError {
        let err = err.into();
        // A duplicate email is a client mistake, not a server failure.
        let stage = match &err {
            AppError::Core(CoreError::Conflict(_)) => ProvisionStage::Rejected,
            _ => ProvisionStage::Failed,
        };
        self.advance(stage);
        err
    }
}

fn parse_role(raw: Option<String>) -> Result<Option<AppRole>, CoreError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => AppRole::parse(&name.to_lowercase())
            .map(Some)
            .ok_or_else(|| CoreError::Validation(format!("Unknown role: {name}"))),
    }
}

/// POST /api/v1/admin/users
///
/// Provision a pre-verified account: identity, allow-list entry and role are
/// created together or not at all. The caller must be an admin (401 without
/// a valid token, 403 otherwise); missing fields are a 400 and a taken email
/// a 409, all checked in that order and before any write.
pub async fn provision_user(
    State(state): State<AppState>,
    admin: Result<RequireAdmin, AppError>,
    body: Result<AppJson<ProvisionUserRequest>, AppError>,
) -> AppResult<Json<SuccessResponse>> {
    let mut trace = ProvisionTrace::start();

    let RequireAdmin(admin) = admin.map_err(|e| trace.reject(e))?;
    trace.advance(ProvisionStage::AuthChecked);

    let AppJson(body) = body.map_err(|e| trace.reject(e))?;
    let role = parse_role(body.role).map_err(|e| trace.reject(e))?;
    let input = provisioning::validate(ProvisionInput {
        email: body.email,
        secret: body.secret,
        role,
    })
    .map_err(|e| trace.reject(e))?;
    trace.advance(ProvisionStage::Validated);

    let secret_hash = hash_password(&input.secret).map_err(|e| {
        trace.fail(AppError::InternalError(format!(
            "Password hashing error: {e}"
        )))
    })?;
    let account = NewAccount {
        email: input.email,
        secret_hash,
        role: input.role,
    };

    let created = ProvisioningRepo::provision(&state.pool, &account)
        .await
        .map_err(|e| trace.fail(e))?;
    trace.advance(ProvisionStage::Provisioned);

    tracing::info!(
        user_id = created.identity.id,
        email = %created.identity.email,
        role = %account.role,
        admin_id = admin.user_id,
        "User provisioned"
    );
    trace.advance(ProvisionStage::Committed);

    Ok(Json(SuccessResponse::ok()))
}

// ---------------------------------------------------------------------------
// Listing and removal
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
///
/// The allow-list with identity ids, roles and booked seats.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<AllowedUserOverview>>>> {
    authorize(&admin, Table::AllowedUser, Operation::Read, None)?;
    let users = AllowedUserRepo::list_overview(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Remove a user and free their seat. Returns 204 No Content.
pub async fn remove_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !IdentityRepo::remove(&state.pool, &admin, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// PUT /api/v1/admin/users/{id}/roles
///
/// Grant a role. 409 `DUPLICATE_ROLE` if the user already has it.
pub async fn grant_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<GrantRoleRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserRole>>)> {
    let role = RoleRepo::grant(&state.pool, &admin, id, input.role).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: role })))
}

/// DELETE /api/v1/admin/users/{id}/roles/{role}
///
/// Revoke a role. 409 `LAST_ADMIN` when it would leave no admin.
pub async fn revoke_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((id, role)): Path<(DbId, AppRole)>,
) -> AppResult<StatusCode> {
    if !RoleRepo::revoke(&state.pool, &admin, id, role).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "UserRole",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
