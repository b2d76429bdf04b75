//! Admin flag repository (`admins/{uid}`).
//!
//! A user is an admin only if their flag record exists and is set.

use sqlx::PgPool;
use tracing::instrument;

use afrah_core::UserId;

use crate::RepositoryError;

pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_admin(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let is_admin: Option<bool> =
            sqlx::query_scalar("SELECT is_admin FROM shop.admin_flag WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;
        Ok(is_admin.unwrap_or(false))
    }

    /// Grant admin access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn set_admin(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO shop.admin_flag (user_id, is_admin) VALUES ($1, TRUE) \
             ON CONFLICT (user_id) DO UPDATE SET is_admin = TRUE, granted_at = now()",
        )
        .bind(user_id)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            other => RepositoryError::Database(other),
        })?;
        tracing::info!("admin access granted");
        Ok(())
    }

    /// Revoke admin access by deleting the flag record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn revoke_admin(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.admin_flag WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        tracing::info!("admin access revoked");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_admin_ids(&self) -> Result<Vec<UserId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM shop.admin_flag WHERE is_admin ORDER BY granted_at",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }
}
