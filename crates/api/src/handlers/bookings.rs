//! Handlers for the `/bookings` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use theatre_core::types::DbId;
use theatre_db::models::booking::{Booking, BookingDetail};
use theatre_db::repositories::BookingRepo;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /bookings` and `PUT /admin/bookings/{id}`.
#[derive(Debug, Deserialize)]
pub struct SeatRequest {
    pub seat_id: DbId,
}

/// GET /api/v1/bookings
///
/// Admins see every booking; everyone else sees only their own.
pub async fn list_bookings(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<BookingDetail>>>> {
    let bookings = BookingRepo::list_visible(&state.pool, &caller).await?;
    Ok(Json(DataResponse { data: bookings }))
}

/// POST /api/v1/bookings
///
/// Reserve a seat for the caller. 409 `SEAT_TAKEN` or `ALREADY_BOOKED` when
/// the seat or the caller is already booked.
pub async fn create_booking(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    AppJson(input): AppJson<SeatRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Booking>>)> {
    let booking = BookingRepo::reserve_seat(&state.pool, &caller, input.seat_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: booking })))
}

/// PUT /api/v1/admin/bookings/{id}
///
/// Move a booking to another seat.
pub async fn reassign_booking(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<SeatRequest>,
) -> AppResult<Json<DataResponse<Booking>>> {
    let booking = BookingRepo::reassign_seat(&state.pool, &admin, id, input.seat_id).await?;
    Ok(Json(DataResponse { data: booking }))
}

/// DELETE /api/v1/admin/bookings/{id}
///
/// Cancel a booking and free its seat. Returns 204 No Content.
pub async fn release_booking(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    BookingRepo::release_seat(&state.pool, &admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
