//! Handler for `/me`: the caller's own account.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use theatre_core::error::CoreError;
use theatre_core::policy::{authorize, Operation, Table};
use theatre_db::models::booking::Booking;
use theatre_db::models::identity::IdentityResponse;
use theatre_db::repositories::{BookingRepo, IdentityRepo, RoleRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: IdentityResponse,
    pub roles: Vec<String>,
    pub is_admin: bool,
    pub booking: Option<Booking>,
}

/// GET /api/v1/me
pub async fn get_me(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
) -> AppResult<Json<DataResponse<MeResponse>>> {
    let identity = IdentityRepo::find_by_id(&state.pool, caller.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: caller.user_id,
        }))?;

    authorize(&caller, Table::Role, Operation::Read, Some(caller.user_id))?;
    let roles = RoleRepo::list_for_user(&state.pool, caller.user_id)
        .await?
        .into_iter()
        .map(|r| r.role)
        .collect();

    authorize(&caller, Table::Booking, Operation::Read, Some(caller.user_id))?;
    let booking = BookingRepo::find_for_user(&state.pool, caller.user_id).await?;

    Ok(Json(DataResponse {
        data: MeResponse {
            user: IdentityResponse::from(&identity),
            roles,
            is_admin: caller.is_admin,
            booking,
        },
    }))
}
