//! Role assignment model.

use serde::Serialize;
use sqlx::FromRow;
use theatre_core::types::{DbId, Timestamp};

/// A row from the `user_roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRole {
    pub id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
}
