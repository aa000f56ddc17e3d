//! Seat model.

use serde::Serialize;
use sqlx::FromRow;
use theatre_core::layout::{seat_label, ExistingSeat};
use theatre_core::types::{DbId, Timestamp};

/// A row from the `seats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Seat {
    pub id: DbId,
    pub seat_layout_id: DbId,
    pub row_num: i32,
    pub col_num: i32,
    pub is_booked: bool,
    pub created_at: Timestamp,
}

impl Seat {
    pub fn label(&self) -> String {
        seat_label(self.row_num, self.col_num)
    }
}

impl From<&Seat> for ExistingSeat {
    fn from(seat: &Seat) -> Self {
        Self {
            id: seat.id,
            row_num: seat.row_num,
            col_num: seat.col_num,
            is_booked: seat.is_booked,
        }
    }
}

/// A seat whose `is_booked` flag disagrees with the bookings table.
///
/// `is_booked && !has_booking` is a frozen seat (admin override);
/// `!is_booked && has_booking` is genuine drift.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeatDrift {
    pub seat_id: DbId,
    pub seat_layout_id: DbId,
    pub row_num: i32,
    pub col_num: i32,
    pub is_booked: bool,
    pub has_booking: bool,
}

/// Outcome of regenerating a layout's seats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegenerationSummary {
    pub removed: u64,
    pub inserted: u64,
    pub total: i64,
}
