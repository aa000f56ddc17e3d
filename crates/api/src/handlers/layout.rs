//! Handlers for the venue layout.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use theatre_core::policy::{authorize, Operation, Table};
use theatre_core::types::DbId;
use theatre_db::models::seat::RegenerationSummary;
use theatre_db::models::seat_layout::{SeatLayout, UpsertActiveLayout};
use theatre_db::repositories::{SeatLayoutRepo, SeatRepo};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for a layout change: the new layout and what regeneration did.
#[derive(Debug, Serialize)]
pub struct LayoutUpdateResponse {
    pub layout: SeatLayout,
    pub regeneration: RegenerationSummary,
}

/// GET /api/v1/layout
///
/// The active layout, or `null` if none has been configured yet.
pub async fn get_active_layout(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
) -> AppResult<Json<DataResponse<Option<SeatLayout>>>> {
    authorize(&caller, Table::SeatLayout, Operation::Read, None)?;
    let layout = SeatLayoutRepo::find_active(&state.pool).await?;
    Ok(Json(DataResponse { data: layout }))
}

/// PUT /api/v1/admin/layout
///
/// Set the active layout's geometry and regenerate its seats in one step.
pub async fn update_active_layout(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<UpsertActiveLayout>,
) -> AppResult<Json<DataResponse<LayoutUpdateResponse>>> {
    let (layout, regeneration) = SeatLayoutRepo::upsert_active(&state.pool, &admin, &input).await?;
    Ok(Json(DataResponse {
        data: LayoutUpdateResponse {
            layout,
            regeneration,
        },
    }))
}

/// POST /api/v1/admin/layouts/{id}/regenerate
pub async fn regenerate_layout(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RegenerationSummary>>> {
    let summary = SeatRepo::regenerate(&state.pool, &admin, id).await?;
    Ok(Json(DataResponse { data: summary }))
}
