//! Seat layout model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use theatre_core::error::CoreError;
use theatre_core::layout::Geometry;
use theatre_core::types::{DbId, Timestamp};

/// A row from the `seat_layouts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeatLayout {
    pub id: DbId,
    pub name: String,
    pub total_rows: i32,
    pub total_columns: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SeatLayout {
    pub fn geometry(&self) -> Result<Geometry, CoreError> {
        Geometry::new(self.total_rows, self.total_columns)
    }
}

/// DTO for setting the active layout's name and geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertActiveLayout {
    pub name: Option<String>,
    pub total_rows: i32,
    pub total_columns: i32,
}
