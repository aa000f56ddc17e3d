//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{admin, bookings, layout, seats};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                      -> list_users
/// POST   /users                      -> provision_user
/// DELETE /users/{id}                 -> remove_user
/// PUT    /users/{id}/roles           -> grant_role
/// DELETE /users/{id}/roles/{role}    -> revoke_role
/// PUT    /bookings/{id}              -> reassign_booking
/// DELETE /bookings/{id}              -> release_booking
/// POST   /seats/{id}/freeze          -> freeze_seat
/// POST   /seats/{id}/unfreeze        -> unfreeze_seat
/// GET    /seats/consistency          -> consistency_report
/// PUT    /layout                     -> update_active_layout
/// POST   /layouts/{id}/regenerate    -> regenerate_layout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::provision_user))
        .route("/users/{id}", delete(admin::remove_user))
        .route("/users/{id}/roles", put(admin::grant_role))
        .route("/users/{id}/roles/{role}", delete(admin::revoke_role))
        .route(
            "/bookings/{id}",
            put(bookings::reassign_booking).delete(bookings::release_booking),
        )
        .route("/seats/{id}/freeze", post(seats::freeze_seat))
        .route("/seats/{id}/unfreeze", post(seats::unfreeze_seat))
        .route("/seats/consistency", get(seats::consistency_report))
        .route("/layout", put(layout::update_active_layout))
        .route("/layouts/{id}/regenerate", post(layout::regenerate_layout))
}
