//! Error type for unit-of-work repository methods.

use theatre_core::error::{ConflictKind, CoreError};

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Failure of a transactional repository method.
///
/// Domain rejections (policy, conflicts, missing rows) surface as
/// [`StoreError::Core`]; everything else is a raw database error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    /// Unique violations on known constraints become conflicts; the rest pass
    /// through untouched.
    fn from(err: sqlx::Error) -> Self {
        match unique_violation_kind(&err) {
            Some(kind) => StoreError::Core(CoreError::Conflict(kind)),
            None => StoreError::Database(err),
        }
    }
}

/// Map a unique violation to the conflict it represents, by constraint name.
///
/// A concurrent transaction that slips past the in-transaction checks still
/// loses at commit time on these constraints; this turns that loss into the
/// same conflict the checks would have produced.
pub fn unique_violation_kind(err: &sqlx::Error) -> Option<ConflictKind> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if db_err.code().as_deref() != Some(UNIQUE_VIOLATION) {
        return None;
    }
    match db_err.constraint()? {
        "uq_bookings_user_id" => Some(ConflictKind::AlreadyBooked),
        "uq_bookings_seat_id" => Some(ConflictKind::SeatTaken),
        "uq_identities_email" | "uq_allowed_users_email" => Some(ConflictKind::DuplicateEmail),
        "uq_user_roles_user_id_role" => Some(ConflictKind::DuplicateRole),
        _ => None,
    }
}
