//! Row-level access policy.
//!
//! Every read and write is checked here before it reaches the store, based on
//! the caller's identity and role. The rules are independent of whatever the
//! client believes about itself: [`Caller::is_admin`] is always resolved
//! server-side.
//!
//! | Table        | Read                | Write                                   |
//! |--------------|---------------------|-----------------------------------------|
//! | AllowedUser  | admin               | admin                                   |
//! | Role         | own rows or admin   | admin                                   |
//! | SeatLayout   | any authenticated   | admin                                   |
//! | Seat         | any authenticated   | admin                                   |
//! | Booking      | owner or admin      | insert: self, see [`authorize_booking_insert`]; update/delete: admin |

use crate::error::{ConflictKind, CoreError};
use crate::types::DbId;

/// The authenticated identity a request runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: DbId,
    pub is_admin: bool,
}

impl Caller {
    pub fn new(user_id: DbId, is_admin: bool) -> Self {
        Self { user_id, is_admin }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    AllowedUser,
    Role,
    SeatLayout,
    Seat,
    Booking,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllowedUser => "allowed_users",
            Self::Role => "user_roles",
            Self::SeatLayout => "seat_layouts",
            Self::Seat => "seats",
            Self::Booking => "bookings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Whether `caller` may perform `op` on a row of `table` owned by `owner`.
///
/// `owner` is the row's `user_id` for tables that have one (roles, bookings)
/// and `None` otherwise. A row-owned table with no known owner is only
/// accessible to admins.
pub fn is_allowed(caller: &Caller, table: Table, op: Operation, owner: Option<DbId>) -> bool {
    if caller.is_admin {
        return true;
    }
    let owns = owner == Some(caller.user_id);
    match (table, op) {
        (Table::AllowedUser, _) => false,
        (Table::Role, Operation::Read) => owns,
        (Table::Role, _) => false,
        (Table::SeatLayout | Table::Seat, Operation::Read) => true,
        (Table::SeatLayout | Table::Seat, _) => false,
        (Table::Booking, Operation::Read | Operation::Insert) => owns,
        (Table::Booking, Operation::Update | Operation::Delete) => false,
    }
}

/// Like [`is_allowed`], but returns `Forbidden` on denial.
pub fn authorize(
    caller: &Caller,
    table: Table,
    op: Operation,
    owner: Option<DbId>,
) -> Result<(), CoreError> {
    if is_allowed(caller, table, op, owner) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Not permitted to {} {}",
            op.as_str(),
            table.as_str()
        )))
    }
}

/// State a booking insert is checked against.
///
/// Must be read inside the same transaction as the insert, after the seat row
/// has been locked, or the check is meaningless under concurrency.
#[derive(Debug, Clone, Copy)]
pub struct BookingInsertCheck {
    /// The `user_id` the new booking would carry.
    pub user_id: DbId,
    /// Whether that user already holds a booking.
    pub user_has_booking: bool,
    /// Current `is_booked` flag of the target seat.
    pub seat_is_booked: bool,
}

/// Authorize a booking insert.
///
/// Callers (admins included) may only book for themselves, only while they
/// hold no booking, and only an unbooked seat.
pub fn authorize_booking_insert(
    caller: &Caller,
    check: &BookingInsertCheck,
) -> Result<(), CoreError> {
    if check.user_id != caller.user_id {
        return Err(CoreError::Forbidden(
            "Bookings can only be created for yourself".into(),
        ));
    }
    if check.user_has_booking {
        return Err(CoreError::Conflict(ConflictKind::AlreadyBooked));
    }
    if check.seat_is_booked {
        return Err(CoreError::Conflict(ConflictKind::SeatTaken));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const ALL_OPS: [Operation; 4] = [
        Operation::Read,
        Operation::Insert,
        Operation::Update,
        Operation::Delete,
    ];

    const ALL_TABLES: [Table; 5] = [
        Table::AllowedUser,
        Table::Role,
        Table::SeatLayout,
        Table::Seat,
        Table::Booking,
    ];

    fn user(id: DbId) -> Caller {
        Caller::new(id, false)
    }

    fn admin(id: DbId) -> Caller {
        Caller::new(id, true)
    }

    #[test]
    fn test_admin_may_do_everything() {
        let caller = admin(1);
        for table in ALL_TABLES {
            for op in ALL_OPS {
                assert!(is_allowed(&caller, table, op, Some(99)), "{table:?} {op:?}");
                assert!(is_allowed(&caller, table, op, None), "{table:?} {op:?}");
            }
        }
    }

    #[test]
    fn test_allow_list_is_admin_only() {
        for op in ALL_OPS {
            assert!(!is_allowed(&user(1), Table::AllowedUser, op, None));
        }
    }

    #[test]
    fn test_user_reads_own_roles_only() {
        assert!(is_allowed(&user(7), Table::Role, Operation::Read, Some(7)));
        assert!(!is_allowed(&user(7), Table::Role, Operation::Read, Some(8)));
        assert!(!is_allowed(&user(7), Table::Role, Operation::Read, None));
    }

    #[test]
    fn test_user_cannot_write_roles_even_own() {
        for op in [Operation::Insert, Operation::Update, Operation::Delete] {
            assert!(!is_allowed(&user(7), Table::Role, op, Some(7)));
        }
    }

    #[test]
    fn test_layout_and_seats_readable_but_not_writable() {
        for table in [Table::SeatLayout, Table::Seat] {
            assert!(is_allowed(&user(3), table, Operation::Read, None));
            for op in [Operation::Insert, Operation::Update, Operation::Delete] {
                assert!(!is_allowed(&user(3), table, op, None), "{table:?} {op:?}");
            }
        }
    }

    #[test]
    fn test_booking_read_owner_only() {
        assert!(is_allowed(&user(5), Table::Booking, Operation::Read, Some(5)));
        assert!(!is_allowed(&user(5), Table::Booking, Operation::Read, Some(6)));
    }

    #[test]
    fn test_booking_update_and_delete_admin_only() {
        for op in [Operation::Update, Operation::Delete] {
            assert!(!is_allowed(&user(5), Table::Booking, op, Some(5)));
            assert!(is_allowed(&admin(5), Table::Booking, op, Some(6)));
        }
    }

    #[test]
    fn test_authorize_denial_is_forbidden() {
        let result = authorize(&user(1), Table::Seat, Operation::Update, None);
        assert_matches!(result, Err(CoreError::Forbidden(msg)) if msg.contains("seats"));
    }

    #[test]
    fn test_booking_insert_for_self_on_free_seat() {
        let check = BookingInsertCheck {
            user_id: 4,
            user_has_booking: false,
            seat_is_booked: false,
        };
        assert!(authorize_booking_insert(&user(4), &check).is_ok());
    }

    #[test]
    fn test_booking_insert_for_someone_else_is_forbidden() {
        let check = BookingInsertCheck {
            user_id: 5,
            user_has_booking: false,
            seat_is_booked: false,
        };
        assert_matches!(
            authorize_booking_insert(&user(4), &check),
            Err(CoreError::Forbidden(_))
        );
        // Admin status does not lift the self-only rule.
        assert_matches!(
            authorize_booking_insert(&admin(4), &check),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn test_booking_insert_when_already_booked() {
        let check = BookingInsertCheck {
            user_id: 4,
            user_has_booking: true,
            seat_is_booked: true,
        };
        assert_matches!(
            authorize_booking_insert(&user(4), &check),
            Err(CoreError::Conflict(ConflictKind::AlreadyBooked))
        );
    }

    #[test]
    fn test_booking_insert_on_taken_seat() {
        let check = BookingInsertCheck {
            user_id: 4,
            user_has_booking: false,
            seat_is_booked: true,
        };
        assert_matches!(
            authorize_booking_insert(&user(4), &check),
            Err(CoreError::Conflict(ConflictKind::SeatTaken))
        );
    }
}
