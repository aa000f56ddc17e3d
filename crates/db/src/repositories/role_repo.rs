//! Repository for the `user_roles` table.

use sqlx::{PgConnection, PgPool};
use theatre_core::error::{ConflictKind, CoreError};
use theatre_core::policy::{authorize, Caller, Operation, Table};
use theatre_core::roles::{AppRole, ROLE_ADMIN};
use theatre_core::types::DbId;

use crate::error::StoreError;
use crate::models::role::UserRole;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, role, created_at";

/// Provides role lookups and admin-only role management.
pub struct RoleRepo;

impl RoleRepo {
    /// All role rows held by a user, ordered by role name.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<UserRole>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_roles WHERE user_id = $1 ORDER BY role");
        sqlx::query_as::<_, UserRole>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Whether the user holds `role`.
    pub async fn has_role(pool: &PgPool, user_id: DbId, role: AppRole) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2)",
        )
        .bind(user_id)
        .bind(role.as_str())
        .fetch_one(pool)
        .await
    }

    /// Grant `role` to a user. Admin only.
    ///
    /// Fails with [`ConflictKind::DuplicateRole`] if the user already has it.
    pub async fn grant(
        pool: &PgPool,
        caller: &Caller,
        user_id: DbId,
        role: AppRole,
    ) -> Result<UserRole, StoreError> {
        authorize(caller, Table::Role, Operation::Insert, Some(user_id))?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM identities WHERE id = $1)")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        if !exists {
            return Err(CoreError::NotFound {
                entity: "User",
                id: user_id,
            }
            .into());
        }

        let query = format!(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRole>(&query)
            .bind(user_id)
            .bind(role.as_str())
            .fetch_one(pool)
            .await?;
        tracing::info!(user_id, role = %role, granted_by = caller.user_id, "Role granted");
        Ok(row)
    }

    /// Revoke `role` from a user. Admin only.
    ///
    /// Returns `false` if the user did not hold the role. Revoking the last
    /// remaining admin fails with [`ConflictKind::LastAdmin`].
    pub async fn revoke(
        pool: &PgPool,
        caller: &Caller,
        user_id: DbId,
        role: AppRole,
    ) -> Result<bool, StoreError> {
        authorize(caller, Table::Role, Operation::Delete, Some(user_id))?;

        let mut tx = pool.begin().await?;
        if role == AppRole::Admin {
            ensure_not_last_admin(&mut tx, user_id).await?;
        }
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = $2")
            .bind(user_id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let revoked = result.rows_affected() > 0;
        if revoked {
            tracing::info!(user_id, role = %role, revoked_by = caller.user_id, "Role revoked");
        }
        Ok(revoked)
    }
}

/// Fail with [`ConflictKind::LastAdmin`] if `user_id` is the only admin.
///
/// Locks every admin row so concurrent revocations serialise; a second
/// transaction re-reads the set after the first commits.
pub(crate) async fn ensure_not_last_admin(
    conn: &mut PgConnection,
    user_id: DbId,
) -> Result<(), StoreError> {
    let admins: Vec<DbId> =
        sqlx::query_scalar("SELECT user_id FROM user_roles WHERE role = $1 FOR UPDATE")
            .bind(ROLE_ADMIN)
            .fetch_all(&mut *conn)
            .await?;
    if admins.contains(&user_id) && admins.len() == 1 {
        return Err(CoreError::Conflict(ConflictKind::LastAdmin).into());
    }
    Ok(())
}
