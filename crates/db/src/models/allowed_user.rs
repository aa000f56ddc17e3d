//! Allow-list entry model.

use serde::Serialize;
use sqlx::FromRow;
use theatre_core::types::{DbId, Timestamp};

/// A row from the `allowed_users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AllowedUser {
    pub id: DbId,
    pub email: String,
    #[serde(skip_serializing)]
    pub credential_secret_hash: String,
    pub created_at: Timestamp,
}

/// Allow-list entry joined with its identity and role names, for the admin
/// user list. `user_id` is `None` when no identity exists for the email.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AllowedUserOverview {
    pub id: DbId,
    pub email: String,
    pub user_id: Option<DbId>,
    pub roles: Vec<String>,
    pub seat_id: Option<DbId>,
    pub created_at: Timestamp,
}
