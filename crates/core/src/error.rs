use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(ConflictKind),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// The distinguishable reasons a write can lose against existing state.
///
/// Each kind carries a stable machine-readable code so clients can tell
/// "seat taken" apart from "you already have a seat" without parsing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The target seat is already booked (or frozen).
    SeatTaken,
    /// The caller already holds a booking.
    AlreadyBooked,
    /// An identity or allow-list entry with this email already exists.
    DuplicateEmail,
    /// The user already holds the role being granted.
    DuplicateRole,
    /// A seat override was attempted on a seat that has a booking.
    SeatHasBooking,
    /// Shrinking the layout would strand a booked seat outside the grid.
    BookedSeatOutsideLayout,
    /// Revoking the role would leave the venue without any admin.
    LastAdmin,
}

impl ConflictKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::SeatTaken => "SEAT_TAKEN",
            Self::AlreadyBooked => "ALREADY_BOOKED",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::DuplicateRole => "DUPLICATE_ROLE",
            Self::SeatHasBooking => "SEAT_HAS_BOOKING",
            Self::BookedSeatOutsideLayout => "BOOKED_SEAT_OUTSIDE_LAYOUT",
            Self::LastAdmin => "LAST_ADMIN",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::SeatTaken => "Seat is already taken",
            Self::AlreadyBooked => "You already have a booking",
            Self::DuplicateEmail => "A user with this email already exists",
            Self::DuplicateRole => "User already has this role",
            Self::SeatHasBooking => "Seat has a booking; release or reassign it instead",
            Self::BookedSeatOutsideLayout => {
                "Layout change would remove a booked or frozen seat; release or unfreeze it first"
            }
            Self::LastAdmin => "Cannot revoke the last admin role",
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
