//! Route definitions for the `/bookings` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::bookings;
use crate::state::AppState;

/// Routes mounted at `/bookings`.
///
/// ```text
/// GET  /    -> list_bookings
/// POST /    -> create_booking
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(bookings::list_bookings).post(bookings::create_booking),
    )
}
