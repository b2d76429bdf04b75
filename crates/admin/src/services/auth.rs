//! Back-office sign-in: an ordinary account password plus the admin flag.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::http::StatusCode;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use afrah_core::{Email, EmailError};
use afrah_store::models::UserProfile;
use afrah_store::{AdminRepository, RepositoryError, UserRepository};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Wrong password or unknown email.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The password was right but the account has no admin flag.
    #[error("not an admin")]
    NotAdmin,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidEmail(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotAdmin => StatusCode::FORBIDDEN,
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Repository(_))
    }

    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.",
            Self::InvalidCredentials => "Invalid email or password.",
            Self::NotAdmin => "You do not have permission to access the admin panel.",
            Self::Repository(_) => "There was a problem with your request.",
        }
    }
}

pub struct AuthService<'a> {
    users: UserRepository<'a>,
    admins: AdminRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            admins: AdminRepository::new(pool),
        }
    }

    /// Check the password, then the admin flag.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or wrong
    /// password and `AuthError::NotAdmin` when the account is not an admin.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let email = Email::parse(email)?;
        let credentials = self
            .users
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &credentials.password_hash)?;

        if !self.admins.is_admin(credentials.profile.id).await? {
            tracing::warn!(user_id = %credentials.profile.id, "non-admin tried to sign in");
            return Err(AuthError::NotAdmin);
        }
        Ok(credentials.profile)
    }
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

    use super::*;

    #[test]
    fn test_verify_password() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"mustard-oil-1kg", &salt)
            .unwrap()
            .to_string();
        assert!(verify_password("mustard-oil-1kg", &hash).is_ok());
        assert!(matches!(
            verify_password("ghee", &hash),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            verify_password("x", "garbage"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_not_admin_is_forbidden() {
        assert_eq!(AuthError::NotAdmin.status(), StatusCode::FORBIDDEN);
        assert!(!AuthError::NotAdmin.is_server_error());
    }
}
