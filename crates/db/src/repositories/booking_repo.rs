//! Repository for the `bookings` table.
//!
//! Bookings are only ever written through [`BookingRepo::reserve_seat`],
//! [`BookingRepo::release_seat`] and [`BookingRepo::reassign_seat`]. Each is
//! one transaction that changes the booking row and the affected seats'
//! `is_booked` flags together, so no committed state has a booking with a
//! free seat or a booked seat without its booking.

use sqlx::{PgConnection, PgPool};
use theatre_core::error::{ConflictKind, CoreError};
use theatre_core::policy::{
    authorize, authorize_booking_insert, BookingInsertCheck, Caller, Operation, Table,
};
use theatre_core::types::DbId;

use super::seat_repo::{self, lock_seat, set_booked_flag};
use crate::error::StoreError;
use crate::models::booking::{Booking, BookingDetail};
use crate::models::seat::Seat;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, seat_id, created_at, updated_at";

/// Joined projection used by the list endpoints.
const DETAIL_SELECT: &str = "SELECT b.id, b.user_id, i.email, b.seat_id, s.row_num, s.col_num, \
                             b.created_at \
                             FROM bookings b \
                             JOIN identities i ON i.id = b.user_id \
                             JOIN seats s ON s.id = b.seat_id";

/// Provides booking reads and the seat/booking units of work.
pub struct BookingRepo;

impl BookingRepo {
    /// Find a booking by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The user's booking, if any.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE user_id = $1");
        sqlx::query_as::<_, Booking>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Bookings visible to `caller`: all of them for admins, otherwise only
    /// the caller's own.
    pub async fn list_visible(
        pool: &PgPool,
        caller: &Caller,
    ) -> Result<Vec<BookingDetail>, sqlx::Error> {
        if caller.is_admin {
            let query = format!("{DETAIL_SELECT} ORDER BY s.row_num, s.col_num");
            sqlx::query_as::<_, BookingDetail>(&query)
                .fetch_all(pool)
                .await
        } else {
            let query = format!("{DETAIL_SELECT} WHERE b.user_id = $1");
            sqlx::query_as::<_, BookingDetail>(&query)
                .bind(caller.user_id)
                .fetch_all(pool)
                .await
        }
    }

    /// Reserve a seat for the caller.
    ///
    /// Locks the seat, then evaluates the insert policy against the locked
    /// state: the caller must hold no booking and the seat must be free. Of
    /// two concurrent reservations for one seat, the second waits on the lock
    /// and then sees the seat taken. Two concurrent reservations by one user
    /// for different seats both pass the check, and the loser fails on
    /// `uq_bookings_user_id` with [`ConflictKind::AlreadyBooked`].
    pub async fn reserve_seat(
        pool: &PgPool,
        caller: &Caller,
        seat_id: DbId,
    ) -> Result<Booking, StoreError> {
        let mut tx = pool.begin().await?;

        let seat = lock_seat(&mut tx, seat_id).await?;
        let user_has_booking: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookings WHERE user_id = $1)")
                .bind(caller.user_id)
                .fetch_one(&mut *tx)
                .await?;

        authorize_booking_insert(
            caller,
            &BookingInsertCheck {
                user_id: caller.user_id,
                user_has_booking,
                seat_is_booked: seat.is_booked,
            },
        )?;

        let query = format!(
            "INSERT INTO bookings (user_id, seat_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(caller.user_id)
            .bind(seat_id)
            .fetch_one(&mut *tx)
            .await?;
        set_booked_flag(&mut tx, seat_id, true).await?;

        tx.commit().await?;

        tracing::info!(booking_id = booking.id, user_id = caller.user_id, seat_id, "Seat reserved");
        Ok(booking)
    }

    /// Delete a booking and free its seat. Admin only.
    pub async fn release_seat(
        pool: &PgPool,
        caller: &Caller,
        booking_id: DbId,
    ) -> Result<Booking, StoreError> {
        let mut tx = pool.begin().await?;

        let booking = lock_booking(&mut tx, booking_id).await?;
        authorize(caller, Table::Booking, Operation::Delete, Some(booking.user_id))?;

        release_in(&mut tx, &booking).await?;
        tx.commit().await?;

        tracing::info!(
            booking_id,
            seat_id = booking.seat_id,
            admin_id = caller.user_id,
            "Seat released"
        );
        Ok(booking)
    }

    /// Move a booking to another seat. Admin only.
    ///
    /// Both seats are locked in ascending id order, the booking is updated,
    /// the old seat freed and the new one occupied before commit. Readers see
    /// either the old assignment or the new one, never both seats booked or
    /// both free. Reassigning to the current seat is a no-op.
    pub async fn reassign_seat(
        pool: &PgPool,
        caller: &Caller,
        booking_id: DbId,
        new_seat_id: DbId,
    ) -> Result<Booking, StoreError> {
        let mut tx = pool.begin().await?;

        let booking = lock_booking(&mut tx, booking_id).await?;
        authorize(caller, Table::Booking, Operation::Update, Some(booking.user_id))?;

        if booking.seat_id == new_seat_id {
            tx.commit().await?;
            return Ok(booking);
        }

        let old_seat_id = booking.seat_id;
        let query = format!(
            "SELECT {} FROM seats WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            seat_repo::COLUMNS
        );
        let seats = sqlx::query_as::<_, Seat>(&query)
            .bind(vec![old_seat_id, new_seat_id])
            .fetch_all(&mut *tx)
            .await?;
        let new_seat = seats
            .iter()
            .find(|s| s.id == new_seat_id)
            .ok_or(CoreError::NotFound {
                entity: "Seat",
                id: new_seat_id,
            })?;
        if new_seat.is_booked {
            return Err(CoreError::Conflict(ConflictKind::SeatTaken).into());
        }

        let query = format!("UPDATE bookings SET seat_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let updated = sqlx::query_as::<_, Booking>(&query)
            .bind(booking_id)
            .bind(new_seat_id)
            .fetch_one(&mut *tx)
            .await?;
        set_booked_flag(&mut tx, old_seat_id, false).await?;
        set_booked_flag(&mut tx, new_seat_id, true).await?;

        tx.commit().await?;

        tracing::info!(
            booking_id,
            old_seat_id,
            new_seat_id,
            admin_id = caller.user_id,
            "Seat reassigned"
        );
        Ok(updated)
    }
}

/// Lock a booking row for the rest of the transaction.
async fn lock_booking(conn: &mut PgConnection, booking_id: DbId) -> Result<Booking, StoreError> {
    let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE");
    let booking = sqlx::query_as::<_, Booking>(&query)
        .bind(booking_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Booking",
            id: booking_id,
        })?;
    Ok(booking)
}

/// Delete a locked booking and clear its seat's flag.
pub(crate) async fn release_in(conn: &mut PgConnection, booking: &Booking) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM bookings WHERE id = $1")
        .bind(booking.id)
        .execute(&mut *conn)
        .await?;
    set_booked_flag(conn, booking.seat_id, false).await?;
    Ok(())
}

/// Lock the booking held by `user_id`, if any.
pub(crate) async fn lock_booking_for_user(
    conn: &mut PgConnection,
    user_id: DbId,
) -> Result<Option<Booking>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM bookings WHERE user_id = $1 FOR UPDATE");
    sqlx::query_as::<_, Booking>(&query)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
}
