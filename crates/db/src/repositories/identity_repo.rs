//! Repository for the `identities` table (the authentication store).

use sqlx::PgPool;
use theatre_core::error::CoreError;
use theatre_core::policy::{authorize, Caller, Operation, Table};
use theatre_core::types::DbId;

use super::booking_repo::{lock_booking_for_user, release_in};
use super::role_repo::ensure_not_last_admin;
use crate::error::StoreError;
use crate::models::identity::Identity;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str =
    "id, email, password_hash, email_confirmed, created_at, updated_at";

/// Provides identity lookups and admin removal. Identities are created only
/// by [`ProvisioningRepo`](super::ProvisioningRepo).
pub struct IdentityRepo;

impl IdentityRepo {
    /// Find an identity by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Identity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM identities WHERE id = $1");
        sqlx::query_as::<_, Identity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an identity by normalised email.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Identity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM identities WHERE email = $1");
        sqlx::query_as::<_, Identity>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Remove a user entirely. Admin only.
    ///
    /// In one transaction: releases the user's booking (freeing the seat),
    /// deletes the allow-list entry and the identity (roles cascade). The last
    /// admin cannot be removed. Returns `false` if no such identity exists.
    pub async fn remove(pool: &PgPool, caller: &Caller, user_id: DbId) -> Result<bool, StoreError> {
        authorize(caller, Table::AllowedUser, Operation::Delete, None)?;

        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM identities WHERE id = $1 FOR UPDATE");
        let Some(identity) = sqlx::query_as::<_, Identity>(&query)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(false);
        };

        ensure_not_last_admin(&mut tx, user_id).await?;

        if let Some(booking) = lock_booking_for_user(&mut tx, user_id).await? {
            release_in(&mut tx, &booking).await?;
        }

        sqlx::query("DELETE FROM allowed_users WHERE email = $1")
            .bind(&identity.email)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM identities WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() != 1 {
            return Err(CoreError::Internal(format!("identity {user_id} vanished during removal")).into());
        }

        tx.commit().await?;

        tracing::info!(user_id, email = %identity.email, admin_id = caller.user_id, "User removed");
        Ok(true)
    }
}
