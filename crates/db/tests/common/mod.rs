//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use sqlx::PgPool;
use theatre_core::policy::Caller;
use theatre_core::roles::AppRole;
use theatre_db::models::seat::Seat;
use theatre_db::models::seat_layout::{SeatLayout, UpsertActiveLayout};
use theatre_db::repositories::provisioning_repo::NewAccount;
use theatre_db::repositories::{ProvisioningRepo, SeatLayoutRepo, SeatRepo};

/// Provision an account directly and return it as a [`Caller`].
pub async fn provision(pool: &PgPool, email: &str, role: AppRole) -> Caller {
    let account = NewAccount {
        email: email.to_string(),
        secret_hash: "$argon2id$test-fixture".to_string(),
        role,
    };
    let created = ProvisioningRepo::provision(pool, &account)
        .await
        .expect("provisioning should succeed");
    Caller::new(created.identity.id, role == AppRole::Admin)
}

pub async fn admin(pool: &PgPool) -> Caller {
    provision(pool, "admin@theatre.test", AppRole::Admin).await
}

pub async fn user(pool: &PgPool, name: &str) -> Caller {
    provision(pool, &format!("{name}@theatre.test"), AppRole::User).await
}

/// Configure the active layout with the given geometry.
pub async fn layout(pool: &PgPool, admin: &Caller, rows: i32, columns: i32) -> SeatLayout {
    let input = UpsertActiveLayout {
        name: Some("Test Hall".to_string()),
        total_rows: rows,
        total_columns: columns,
    };
    let (layout, _) = SeatLayoutRepo::upsert_active(pool, admin, &input)
        .await
        .expect("layout upsert should succeed");
    layout
}

/// The seat at `(row, col)` of a layout.
pub async fn seat_at(pool: &PgPool, layout_id: i64, row: i32, col: i32) -> Seat {
    SeatRepo::list_for_layout(pool, layout_id)
        .await
        .expect("seat listing should succeed")
        .into_iter()
        .find(|s| s.row_num == row && s.col_num == col)
        .unwrap_or_else(|| panic!("seat ({row}, {col}) should exist"))
}

/// Assert that every seat's `is_booked` matches the bookings table.
pub async fn assert_consistent(pool: &PgPool) {
    let drift = SeatRepo::consistency_report(pool)
        .await
        .expect("consistency report should succeed");
    assert!(drift.is_empty(), "seat flags drifted from bookings: {drift:?}");
}

pub async fn count(pool: &PgPool, sql: &str) -> i64 {
    sqlx::query_scalar(sql)
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("{sql} failed: {e}"))
}
