//! Authentication error types.

use axum::http::StatusCode;
use thiserror::Error;

use afrah_core::EmailError;
use afrah_store::RepositoryError;

/// Errors that can occur during sign-up and sign-in.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Wrong password or unknown email; callers cannot tell which.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("password validation failed: {0}")]
    WeakPassword(String),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::InvalidEmail(_) | Self::WeakPassword(_) => StatusCode::BAD_REQUEST,
            Self::Repository(_) | Self::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::PasswordHash)
    }

    /// Message safe to show on the login page.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.",
            Self::InvalidCredentials => "Invalid email or password.",
            Self::UserAlreadyExists => "An account with this email already exists.",
            Self::WeakPassword(message) => message.as_str(),
            Self::Repository(_) | Self::PasswordHash => "There was a problem with your request.",
        }
    }
}
