//! Back-office access management.
//!
//! Accounts are created through the shop's sign-up form; these commands
//! only flip the admin flag on an existing account.

use sqlx::PgPool;
use thiserror::Error;

use afrah_core::{Email, UserId};
use afrah_store::{AdminRepository, RepositoryError, UserRepository};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("No account with email: {0}")]
    UnknownUser(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

async fn find_user(pool: &PgPool, email: &str) -> Result<(UserId, String), AdminError> {
    let email = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;
    let user = UserRepository::new(pool)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AdminError::UnknownUser(email.to_string()))?;
    Ok((user.id, user.display_name))
}

/// # Errors
///
/// Returns an error if the email is invalid, unknown, or the write fails.
pub async fn grant(pool: &PgPool, email: &str) -> Result<(), AdminError> {
    let (id, name) = find_user(pool, email).await?;
    AdminRepository::new(pool).set_admin(id).await?;
    tracing::info!(user_id = %id, "{name} is now an admin.");
    Ok(())
}

/// # Errors
///
/// Returns an error if the email is invalid, unknown, or the write fails.
pub async fn revoke(pool: &PgPool, email: &str) -> Result<(), AdminError> {
    let (id, name) = find_user(pool, email).await?;
    AdminRepository::new(pool).revoke_admin(id).await?;
    tracing::info!(user_id = %id, "{name} is no longer an admin.");
    Ok(())
}

/// # Errors
///
/// Returns an error if the query fails.
pub async fn list(pool: &PgPool) -> Result<(), AdminError> {
    let admins: Vec<_> = UserRepository::new(pool)
        .list_with_roles()
        .await?
        .into_iter()
        .filter(|user| user.is_admin)
        .collect();

    if admins.is_empty() {
        tracing::info!("No admins yet. Grant one with `afrah-cli admin grant -e EMAIL`.");
        return Ok(());
    }

    tracing::info!("Admins ({}):", admins.len());
    for admin in admins {
        tracing::info!(
            "  #{} {} <{}>",
            admin.profile.id,
            admin.profile.display_name,
            admin.profile.email
        );
    }
    Ok(())
}
