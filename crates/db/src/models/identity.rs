//! Identity (authentication store) model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use theatre_core::types::{DbId, Timestamp};

/// Full row from the `identities` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`IdentityResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Identity {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe identity representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct IdentityResponse {
    pub id: DbId,
    pub email: String,
    pub email_confirmed: bool,
    pub created_at: Timestamp,
}

impl From<&Identity> for IdentityResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            email_confirmed: identity.email_confirmed,
            created_at: identity.created_at,
        }
    }
}
