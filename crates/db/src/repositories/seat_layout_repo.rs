//! Repository for the `seat_layouts` table.

use sqlx::PgPool;
use theatre_core::layout::Geometry;
use theatre_core::policy::{authorize, Caller, Operation, Table};
use theatre_core::types::DbId;

use super::seat_repo::regenerate_in;
use crate::error::StoreError;
use crate::models::seat::RegenerationSummary;
use crate::models::seat_layout::{SeatLayout, UpsertActiveLayout};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str =
    "id, name, total_rows, total_columns, is_active, created_at, updated_at";

/// Name given to the active layout when none is supplied on creation.
const DEFAULT_LAYOUT_NAME: &str = "Main Hall";

/// Provides access to the venue layout. A partial unique index guarantees at
/// most one active layout.
pub struct SeatLayoutRepo;

impl SeatLayoutRepo {
    /// The active layout, if one has been configured.
    pub async fn find_active(pool: &PgPool) -> Result<Option<SeatLayout>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seat_layouts WHERE is_active");
        sqlx::query_as::<_, SeatLayout>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Find a layout by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SeatLayout>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seat_layouts WHERE id = $1");
        sqlx::query_as::<_, SeatLayout>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set the active layout's name and geometry and regenerate its seats.
    /// Admin only.
    ///
    /// Creates the active layout if none exists. The layout write and the
    /// seat regeneration commit together or not at all, so a geometry change
    /// that would strand a booked seat leaves the layout untouched.
    pub async fn upsert_active(
        pool: &PgPool,
        caller: &Caller,
        input: &UpsertActiveLayout,
    ) -> Result<(SeatLayout, RegenerationSummary), StoreError> {
        authorize(caller, Table::SeatLayout, Operation::Update, None)?;
        let geometry = Geometry::new(input.total_rows, input.total_columns)?;
        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM seat_layouts WHERE is_active FOR UPDATE");
        let current = sqlx::query_as::<_, SeatLayout>(&query)
            .fetch_optional(&mut *tx)
            .await?;

        let layout = match current {
            Some(current) => {
                let query = format!(
                    "UPDATE seat_layouts SET
                        name = COALESCE($2, name),
                        total_rows = $3,
                        total_columns = $4
                     WHERE id = $1
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, SeatLayout>(&query)
                    .bind(current.id)
                    .bind(name)
                    .bind(geometry.rows)
                    .bind(geometry.columns)
                    .fetch_one(&mut *tx)
                    .await?
            }
            None => {
                let query = format!(
                    "INSERT INTO seat_layouts (name, total_rows, total_columns, is_active)
                     VALUES ($1, $2, $3, true)
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, SeatLayout>(&query)
                    .bind(name.unwrap_or(DEFAULT_LAYOUT_NAME))
                    .bind(geometry.rows)
                    .bind(geometry.columns)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        let summary = regenerate_in(&mut tx, &layout).await?;
        tx.commit().await?;

        tracing::info!(
            seat_layout_id = layout.id,
            admin_id = caller.user_id,
            "Active layout updated"
        );
        Ok((layout, summary))
    }
}
