//! Route definitions for the layout and seat map.

use axum::routing::get;
use axum::Router;

use crate::handlers::{layout, seats};
use crate::state::AppState;

/// Routes merged at the API root. Any authenticated user.
///
/// ```text
/// GET /layout    -> get_active_layout
/// GET /seats     -> list_seats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/layout", get(layout::get_active_layout))
        .route("/seats", get(seats::list_seats))
}
