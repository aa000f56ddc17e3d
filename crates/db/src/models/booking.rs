//! Booking model.

use serde::Serialize;
use sqlx::FromRow;
use theatre_core::types::{DbId, Timestamp};

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: DbId,
    pub user_id: DbId,
    pub seat_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Booking joined with its seat coordinates and owner email.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingDetail {
    pub id: DbId,
    pub user_id: DbId,
    pub email: String,
    pub seat_id: DbId,
    pub row_num: i32,
    pub col_num: i32,
    pub created_at: Timestamp,
}
