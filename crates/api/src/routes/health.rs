//! Liveness and readiness probe, mounted at the root rather than `/api/v1`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use theatre_db::repositories::SeatLayoutRepo;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok` when bookings can be taken, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub database: bool,
    /// An active layout exists, so there are seats to book.
    pub layout_configured: bool,
}

/// GET /health
///
/// 200 while the database answers, 503 when it does not. A reachable
/// database without an active layout is reported as `degraded` but still 200.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let database = theatre_db::health_check(&state.pool).await.is_ok();
    let layout_configured = database
        && matches!(SeatLayoutRepo::find_active(&state.pool).await, Ok(Some(_)));

    let code = if database {
        StatusCode::OK
    } else {
        tracing::warn!("Health check could not reach the database");
        StatusCode::SERVICE_UNAVAILABLE
    };
    let report = HealthReport {
        status: if layout_configured { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        layout_configured,
    };
    (code, Json(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
