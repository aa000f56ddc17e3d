//! Handlers for seats: the seat map, admin overrides and the drift report.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use theatre_core::policy::{authorize, Operation, Table};
use theatre_core::types::DbId;
use theatre_db::models::seat::{Seat, SeatDrift};
use theatre_db::repositories::{SeatLayoutRepo, SeatRepo};

use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// A seat as shown on the seat map.
#[derive(Debug, Serialize)]
pub struct SeatView {
    pub id: DbId,
    pub seat_layout_id: DbId,
    pub row_num: i32,
    pub col_num: i32,
    pub label: String,
    pub is_booked: bool,
}

impl From<&Seat> for SeatView {
    fn from(seat: &Seat) -> Self {
        Self {
            id: seat.id,
            seat_layout_id: seat.seat_layout_id,
            row_num: seat.row_num,
            col_num: seat.col_num,
            label: seat.label(),
            is_booked: seat.is_booked,
        }
    }
}

/// GET /api/v1/seats
///
/// Seats of the active layout in row-major order. Empty if no layout exists.
pub async fn list_seats(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<SeatView>>>> {
    authorize(&caller, Table::Seat, Operation::Read, None)?;
    let seats = match SeatLayoutRepo::find_active(&state.pool).await? {
        Some(layout) => SeatRepo::list_for_layout(&state.pool, layout.id).await?,
        None => Vec::new(),
    };
    Ok(Json(DataResponse {
        data: seats.iter().map(SeatView::from).collect(),
    }))
}

/// POST /api/v1/admin/seats/{id}/freeze
pub async fn freeze_seat(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SeatView>>> {
    let seat = SeatRepo::freeze(&state.pool, &admin, id).await?;
    Ok(Json(DataResponse {
        data: SeatView::from(&seat),
    }))
}

/// POST /api/v1/admin/seats/{id}/unfreeze
pub async fn unfreeze_seat(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SeatView>>> {
    let seat = SeatRepo::unfreeze(&state.pool, &admin, id).await?;
    Ok(Json(DataResponse {
        data: SeatView::from(&seat),
    }))
}

/// GET /api/v1/admin/seats/consistency
///
/// Seats whose flag disagrees with the bookings table. Frozen seats show up
/// here with `is_booked: true, has_booking: false`.
pub async fn consistency_report(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<SeatDrift>>>> {
    let drift = SeatRepo::consistency_report(&state.pool).await?;
    if drift.iter().any(|d| d.has_booking && !d.is_booked) {
        tracing::warn!(count = drift.len(), "Booked seats with cleared flags found");
    }
    Ok(Json(DataResponse { data: drift }))
}
