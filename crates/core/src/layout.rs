//! Seat layout geometry and seat-grid regeneration planning.
//!
//! Seats are addressed by 1-based `(row_num, col_num)`. A layout of
//! `rows × columns` owns exactly the cells `1..=rows × 1..=columns`.

use crate::error::{ConflictKind, CoreError};
use crate::types::DbId;

/// Largest accepted number of rows in a layout.
pub const MAX_ROWS: i32 = 200;

/// Largest accepted number of columns in a layout.
pub const MAX_COLUMNS: i32 = 200;

/// Validated venue extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub rows: i32,
    pub columns: i32,
}

impl Geometry {
    /// Build a geometry, rejecting non-positive or oversized extents.
    pub fn new(rows: i32, columns: i32) -> Result<Self, CoreError> {
        if !(1..=MAX_ROWS).contains(&rows) {
            return Err(CoreError::Validation(format!(
                "total_rows must be between 1 and {MAX_ROWS}"
            )));
        }
        if !(1..=MAX_COLUMNS).contains(&columns) {
            return Err(CoreError::Validation(format!(
                "total_columns must be between 1 and {MAX_COLUMNS}"
            )));
        }
        Ok(Self { rows, columns })
    }

    pub fn contains(&self, row_num: i32, col_num: i32) -> bool {
        (1..=self.rows).contains(&row_num) && (1..=self.columns).contains(&col_num)
    }

    pub fn seat_count(&self) -> usize {
        // Both extents are validated positive.
        self.rows as usize * self.columns as usize
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (1..=self.rows).flat_map(move |r| (1..=self.columns).map(move |c| (r, c)))
    }
}

/// The parts of an existing seat row regeneration cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingSeat {
    pub id: DbId,
    pub row_num: i32,
    pub col_num: i32,
    pub is_booked: bool,
}

/// Changes needed to bring a layout's seats in line with its geometry.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RegenerationPlan {
    /// Unbooked seats that fall outside the grid.
    pub remove: Vec<DbId>,
    /// Grid cells with no seat row yet, row-major.
    pub insert: Vec<(i32, i32)>,
}

impl RegenerationPlan {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.insert.is_empty()
    }
}

/// Compute the regeneration plan for `existing` seats against `geometry`.
///
/// Seats inside the grid are kept as-is, so their ids and booked state
/// survive. A seat flagged booked outside the grid cannot be removed, whether
/// a booking holds it or an admin froze it; the whole regeneration is refused
/// with [`ConflictKind::BookedSeatOutsideLayout`].
pub fn plan_regeneration(
    existing: &[ExistingSeat],
    geometry: Geometry,
) -> Result<RegenerationPlan, CoreError> {
    if existing
        .iter()
        .any(|s| s.is_booked && !geometry.contains(s.row_num, s.col_num))
    {
        return Err(CoreError::Conflict(ConflictKind::BookedSeatOutsideLayout));
    }

    let remove = existing
        .iter()
        .filter(|s| !geometry.contains(s.row_num, s.col_num))
        .map(|s| s.id)
        .collect();

    let present: std::collections::HashSet<(i32, i32)> =
        existing.iter().map(|s| (s.row_num, s.col_num)).collect();
    let insert = geometry
        .cells()
        .filter(|cell| !present.contains(cell))
        .collect();

    Ok(RegenerationPlan { remove, insert })
}

/// Human-readable seat label: row letters (`A`..`Z`, `AA`..) then column.
pub fn seat_label(row_num: i32, col_num: i32) -> String {
    let mut letters = Vec::new();
    let mut n = row_num;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(char::from(b'A' + rem));
        n = (n - 1) / 26;
    }
    letters.reverse();
    let row: String = letters.into_iter().collect();
    format!("{row}{col_num}")
}
