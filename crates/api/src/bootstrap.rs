//! First-admin provisioning on startup.

use theatre_core::error::{ConflictKind, CoreError};
use theatre_core::provisioning::{self, ProvisionInput};
use theatre_core::roles::AppRole;
use theatre_db::error::StoreError;
use theatre_db::repositories::provisioning_repo::NewAccount;
use theatre_db::repositories::{IdentityRepo, ProvisioningRepo};
use theatre_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Provision the configured admin unless an identity with that email exists.
///
/// Returns `true` if an account was created. Safe to call on every start.
pub async fn ensure_bootstrap_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<bool> {
    let input = provisioning::validate(ProvisionInput {
        email: Some(admin.email.clone()),
        secret: Some(admin.secret.clone()),
        role: Some(AppRole::Admin),
    })?;

    if IdentityRepo::find_by_email(pool, &input.email).await?.is_some() {
        tracing::info!(email = %input.email, "Bootstrap admin already present");
        return Ok(false);
    }

    let secret_hash = hash_password(&input.secret)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let account = NewAccount {
        email: input.email,
        secret_hash,
        role: input.role,
    };

    match ProvisioningRepo::provision(pool, &account).await {
        Ok(created) => {
            tracing::info!(
                user_id = created.identity.id,
                email = %created.identity.email,
                "Bootstrap admin provisioned"
            );
            Ok(true)
        }
        // Another instance won the race.
        Err(StoreError::Core(CoreError::Conflict(ConflictKind::DuplicateEmail))) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
