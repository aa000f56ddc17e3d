//! Repository for the `seats` table.
//!
//! `is_booked` is written in exactly three places: the booking units of work
//! in [`BookingRepo`](super::BookingRepo), identity removal, and the admin
//! freeze override below. Regeneration never touches booked rows.

use sqlx::{PgConnection, PgPool};
use theatre_core::error::{ConflictKind, CoreError};
use theatre_core::layout::{plan_regeneration, ExistingSeat};
use theatre_core::policy::{authorize, Caller, Operation, Table};
use theatre_core::types::DbId;

use crate::error::StoreError;
use crate::models::seat::{RegenerationSummary, Seat, SeatDrift};
use crate::models::seat_layout::SeatLayout;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, seat_layout_id, row_num, col_num, is_booked, created_at";

/// Provides seat reads, regeneration and the admin freeze override.
pub struct SeatRepo;

impl SeatRepo {
    /// Find a seat by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Seat>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seats WHERE id = $1");
        sqlx::query_as::<_, Seat>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All seats of a layout in row-major order.
    pub async fn list_for_layout(
        pool: &PgPool,
        seat_layout_id: DbId,
    ) -> Result<Vec<Seat>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM seats WHERE seat_layout_id = $1 ORDER BY row_num, col_num"
        );
        sqlx::query_as::<_, Seat>(&query)
            .bind(seat_layout_id)
            .fetch_all(pool)
            .await
    }

    /// Seats whose `is_booked` flag disagrees with the bookings table.
    pub async fn consistency_report(pool: &PgPool) -> Result<Vec<SeatDrift>, sqlx::Error> {
        sqlx::query_as::<_, SeatDrift>(
            "SELECT s.id AS seat_id, s.seat_layout_id, s.row_num, s.col_num, s.is_booked,
                    (b.id IS NOT NULL) AS has_booking
             FROM seats s
             LEFT JOIN bookings b ON b.seat_id = s.id
             WHERE s.is_booked <> (b.id IS NOT NULL)
             ORDER BY s.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Regenerate a layout's seat grid from its geometry. Admin only.
    ///
    /// Removes unbooked seats outside the grid and inserts missing cells;
    /// seats inside the grid keep their ids and booked state. Refuses with
    /// [`ConflictKind::BookedSeatOutsideLayout`] when a booked seat would fall
    /// outside the grid.
    pub async fn regenerate(
        pool: &PgPool,
        caller: &Caller,
        seat_layout_id: DbId,
    ) -> Result<RegenerationSummary, StoreError> {
        authorize(caller, Table::Seat, Operation::Insert, None)?;

        let mut tx = pool.begin().await?;
        let query = format!(
            "SELECT {} FROM seat_layouts WHERE id = $1 FOR UPDATE",
            super::seat_layout_repo::COLUMNS
        );
        let layout = sqlx::query_as::<_, SeatLayout>(&query)
            .bind(seat_layout_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "SeatLayout",
                id: seat_layout_id,
            })?;

        let summary = regenerate_in(&mut tx, &layout).await?;
        tx.commit().await?;
        Ok(summary)
    }

    /// Admin override: mark a seat booked without a booking row.
    pub async fn freeze(pool: &PgPool, caller: &Caller, seat_id: DbId) -> Result<Seat, StoreError> {
        set_frozen(pool, caller, seat_id, true).await
    }

    /// Admin override: clear a frozen seat's flag.
    pub async fn unfreeze(
        pool: &PgPool,
        caller: &Caller,
        seat_id: DbId,
    ) -> Result<Seat, StoreError> {
        set_frozen(pool, caller, seat_id, false).await
    }
}

/// Freeze or unfreeze a seat that no booking references.
///
/// Seats with a booking are refused with [`ConflictKind::SeatHasBooking`]:
/// their flag is owned by the booking and changes only with it.
async fn set_frozen(
    pool: &PgPool,
    caller: &Caller,
    seat_id: DbId,
    frozen: bool,
) -> Result<Seat, StoreError> {
    authorize(caller, Table::Seat, Operation::Update, None)?;

    let mut tx = pool.begin().await?;
    lock_seat(&mut tx, seat_id).await?;

    let has_booking: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookings WHERE seat_id = $1)")
            .bind(seat_id)
            .fetch_one(&mut *tx)
            .await?;
    if has_booking {
        return Err(CoreError::Conflict(ConflictKind::SeatHasBooking).into());
    }

    let seat = set_booked_flag(&mut tx, seat_id, frozen).await?;
    tx.commit().await?;

    tracing::info!(seat_id, frozen, admin_id = caller.user_id, "Seat override applied");
    Ok(seat)
}

/// Lock a seat row for the rest of the transaction.
pub(crate) async fn lock_seat(conn: &mut PgConnection, seat_id: DbId) -> Result<Seat, StoreError> {
    let query = format!("SELECT {COLUMNS} FROM seats WHERE id = $1 FOR UPDATE");
    let seat = sqlx::query_as::<_, Seat>(&query)
        .bind(seat_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Seat",
            id: seat_id,
        })?;
    Ok(seat)
}

/// Write a seat's `is_booked` flag. The caller must hold the row lock.
pub(crate) async fn set_booked_flag(
    conn: &mut PgConnection,
    seat_id: DbId,
    is_booked: bool,
) -> Result<Seat, sqlx::Error> {
    let query = format!("UPDATE seats SET is_booked = $2 WHERE id = $1 RETURNING {COLUMNS}");
    sqlx::query_as::<_, Seat>(&query)
        .bind(seat_id)
        .bind(is_booked)
        .fetch_one(&mut *conn)
        .await
}

/// Bring `layout`'s seats in line with its geometry inside an open transaction.
///
/// The caller must hold the layout row lock so regenerations serialise. All
/// seat rows of the layout are locked before planning, which also orders this
/// after any in-flight reservation on one of them.
pub(crate) async fn regenerate_in(
    conn: &mut PgConnection,
    layout: &SeatLayout,
) -> Result<RegenerationSummary, StoreError> {
    let geometry = layout.geometry()?;

    let query = format!(
        "SELECT {COLUMNS} FROM seats WHERE seat_layout_id = $1 ORDER BY id FOR UPDATE"
    );
    let seats = sqlx::query_as::<_, Seat>(&query)
        .bind(layout.id)
        .fetch_all(&mut *conn)
        .await?;
    let existing: Vec<ExistingSeat> = seats.iter().map(ExistingSeat::from).collect();
    let plan = plan_regeneration(&existing, geometry)?;

    let mut removed = 0;
    if !plan.remove.is_empty() {
        removed = sqlx::query("DELETE FROM seats WHERE id = ANY($1) AND is_booked = false")
            .bind(&plan.remove)
            .execute(&mut *conn)
            .await?
            .rows_affected();
    }

    let mut inserted = 0;
    if !plan.insert.is_empty() {
        let (rows, cols): (Vec<i32>, Vec<i32>) = plan.insert.iter().copied().unzip();
        inserted = sqlx::query(
            "INSERT INTO seats (seat_layout_id, row_num, col_num)
             SELECT $1, r, c FROM UNNEST($2::INT4[], $3::INT4[]) AS cells(r, c)
             ON CONFLICT (seat_layout_id, row_num, col_num) DO NOTHING",
        )
        .bind(layout.id)
        .bind(&rows)
        .bind(&cols)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seats WHERE seat_layout_id = $1")
        .bind(layout.id)
        .fetch_one(&mut *conn)
        .await?;

    tracing::info!(
        seat_layout_id = layout.id,
        rows = geometry.rows,
        columns = geometry.columns,
        removed,
        inserted,
        total,
        "Seat grid regenerated"
    );

    Ok(RegenerationSummary {
        removed,
        inserted,
        total,
    })
}
