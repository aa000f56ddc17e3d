//! Repository for the `allowed_users` table.

use sqlx::PgPool;

use crate::models::allowed_user::{AllowedUser, AllowedUserOverview};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, credential_secret_hash, created_at";

/// Provides read operations for the allow-list. Rows are written only by
/// [`ProvisioningRepo`](super::ProvisioningRepo) and removed by
/// [`IdentityRepo::remove`](super::IdentityRepo::remove).
pub struct AllowedUserRepo;

impl AllowedUserRepo {
    /// Find an allow-list entry by normalised email.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<AllowedUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM allowed_users WHERE email = $1");
        sqlx::query_as::<_, AllowedUser>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List the allow-list with identity ids, role names and booked seat,
    /// most recently added first.
    pub async fn list_overview(pool: &PgPool) -> Result<Vec<AllowedUserOverview>, sqlx::Error> {
        sqlx::query_as::<_, AllowedUserOverview>(
            "SELECT a.id, a.email, i.id AS user_id,
                    COALESCE(
                        ARRAY(SELECT r.role FROM user_roles r
                              WHERE r.user_id = i.id ORDER BY r.role),
                        ARRAY[]::TEXT[]
                    ) AS roles,
                    b.seat_id,
                    a.created_at
             FROM allowed_users a
             LEFT JOIN identities i ON i.email = a.email
             LEFT JOIN bookings b ON b.user_id = i.id
             ORDER BY a.created_at DESC, a.id DESC",
        )
        .fetch_all(pool)
        .await
    }
}
