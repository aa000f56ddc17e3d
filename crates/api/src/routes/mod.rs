pub mod admin;
pub mod auth;
pub mod bookings;
pub mod health;
pub mod venue;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                login (public)
///
/// /me                                        own account, roles, booking
///
/// /layout                                    active layout
/// /seats                                     seat map of the active layout
///
/// /bookings                                  list (own or all), reserve
///
/// /admin/users                               list, provision
/// /admin/users/{id}                          remove
/// /admin/users/{id}/roles                    grant (PUT)
/// /admin/users/{id}/roles/{role}             revoke (DELETE)
/// /admin/bookings/{id}                       reassign (PUT), release (DELETE)
/// /admin/seats/{id}/freeze                   override on (POST)
/// /admin/seats/{id}/unfreeze                 override off (POST)
/// /admin/seats/consistency                   drift report
/// /admin/layout                              update active layout (PUT)
/// /admin/layouts/{id}/regenerate             regenerate seats (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .route("/me", get(handlers::me::get_me))
        .merge(venue::router())
        .nest("/bookings", bookings::router())
        .nest("/admin", admin::router())
}
