//! Account provisioning: identity, allow-list entry and role in one step.

use sqlx::PgPool;
use theatre_core::roles::AppRole;

use super::identity_repo;
use crate::error::StoreError;
use crate::models::allowed_user::AllowedUser;
use crate::models::identity::Identity;
use crate::models::role::UserRole;

/// Everything needed to create an account. `email` must be normalised and
/// `secret_hash` already hashed.
#[derive(Debug)]
pub struct NewAccount {
    pub email: String,
    pub secret_hash: String,
    pub role: AppRole,
}

/// Rows created by a successful provisioning.
#[derive(Debug)]
pub struct ProvisionedAccount {
    pub identity: Identity,
    pub allowed_user: AllowedUser,
    pub role: UserRole,
}

/// Writes accounts with elevated privilege.
///
/// This bypasses the row policy on `allowed_users` and `user_roles`; callers
/// are responsible for checking admin status first.
pub struct ProvisioningRepo;

impl ProvisioningRepo {
    /// Create a pre-verified identity, its allow-list entry and its role.
    ///
    /// All three inserts share one transaction: if any fails, none persist. A
    /// duplicate email (in either table) fails with
    /// [`ConflictKind::DuplicateEmail`](theatre_core::error::ConflictKind::DuplicateEmail).
    pub async fn provision(
        pool: &PgPool,
        account: &NewAccount,
    ) -> Result<ProvisionedAccount, StoreError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO identities (email, password_hash, email_confirmed)
             VALUES ($1, $2, true)
             RETURNING {}",
            identity_repo::COLUMNS
        );
        let identity = sqlx::query_as::<_, Identity>(&query)
            .bind(&account.email)
            .bind(&account.secret_hash)
            .fetch_one(&mut *tx)
            .await?;

        let allowed_user = sqlx::query_as::<_, AllowedUser>(
            "INSERT INTO allowed_users (email, credential_secret_hash)
             VALUES ($1, $2)
             RETURNING id, email, credential_secret_hash, created_at",
        )
        .bind(&account.email)
        .bind(&account.secret_hash)
        .fetch_one(&mut *tx)
        .await?;

        let role = sqlx::query_as::<_, UserRole>(
            "INSERT INTO user_roles (user_id, role)
             VALUES ($1, $2)
             RETURNING id, user_id, role, created_at",
        )
        .bind(identity.id)
        .bind(account.role.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ProvisionedAccount {
            identity,
            allowed_user,
            role,
        })
    }
}
