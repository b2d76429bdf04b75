//! User profile repository.

use sqlx::PgPool;
use tracing::instrument;

use afrah_core::{Email, UserId};

use crate::RepositoryError;
use crate::models::{UserCredentials, UserProfile, UserWithRole};

const PROFILE_COLUMNS: &str = "u.id, u.display_name, u.email, u.photo_url, u.created_at";

/// Repository for customer accounts.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an account and its profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, password_hash), fields(email = %email))]
    pub async fn create_with_password(
        &self,
        display_name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<UserProfile, RepositoryError> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "INSERT INTO shop.user_account AS u (display_name, email, password_hash) \
             VALUES ($1, $2, $3) RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(display_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email"))?;
        Ok(profile)
    }

    /// Look up an account with its password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(&format!(
            "SELECT {PROFILE_COLUMNS}, u.password_hash FROM shop.user_account u WHERE u.email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(credentials)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM shop.user_account u WHERE u.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(profile)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<UserProfile>, RepositoryError> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM shop.user_account u WHERE u.email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(profile)
    }

    /// Every account with its admin flag, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_with_roles(&self) -> Result<Vec<UserWithRole>, RepositoryError> {
        let users = sqlx::query_as::<_, UserWithRole>(&format!(
            "SELECT {PROFILE_COLUMNS}, COALESCE(a.is_admin, FALSE) AS is_admin \
             FROM shop.user_account u LEFT JOIN shop.admin_flag a ON a.user_id = u.id \
             ORDER BY u.created_at DESC, u.id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(users)
    }
}
