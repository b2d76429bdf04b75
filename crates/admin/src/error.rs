//! Error handling for back-office handlers.
//!
//! Server errors go to Sentry. Every error response carries an
//! `HX-Trigger` toast so HTMX actions report failures in place.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use afrah_core::{Toast, ValidationErrors};
use afrah_store::{PermissionError, RepositoryError};

use crate::services::auth::AuthError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    PermissionDenied(#[from] PermissionError),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(
                RepositoryError::NotFound
                | RepositoryError::Conflict(_)
                | RepositoryError::InsufficientStock { .. }
                | RepositoryError::EmptyCart,
            ) => false,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => true,
            Self::Auth(err) => err.is_server_error(),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(
                RepositoryError::Conflict(_) | RepositoryError::InsufficientStock { .. },
            ) => StatusCode::CONFLICT,
            Self::Database(RepositoryError::EmptyCart) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Auth(err) => err.status(),
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn toast(&self) -> Toast {
        match self {
            Self::PermissionDenied(_) => Toast::permission_denied(),
            Self::Validation(errors) => {
                let first = errors.iter().next().map_or("Please check the form.", |(_, m)| m);
                Toast::error("Error").with_description(first)
            }
            Self::Auth(err) => Toast::error("Login Failed").with_description(err.user_message()),
            Self::NotFound(_) | Self::Database(RepositoryError::NotFound) => {
                Toast::error("Not found").with_description("It may have been deleted.")
            }
            Self::BadRequest(message) => Toast::error("Error").with_description(message.clone()),
            Self::Database(
                err @ (RepositoryError::Conflict(_) | RepositoryError::InsufficientStock { .. }),
            ) => Toast::error("Error").with_description(err.to_string()),
            _ => Toast::error("Error").with_description("There was a problem with your request."),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let message = if self.is_server_error() {
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };

        let mut response = (self.status(), message).into_response();
        if let Ok(value) = HeaderValue::from_str(&self.toast().hx_trigger()) {
            response.headers_mut().insert("hx-trigger", value);
        }
        response
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Attach the signed-in admin to Sentry events.
pub fn set_sentry_user(user_id: &impl ToString, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: Some(email.to_owned()),
            ..Default::default()
        }));
    });
}

pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| scope.set_user(None));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use afrah_core::OrderId;
    use afrah_store::rules::{DocPath, Operation};

    use super::*;

    fn trigger(response: &Response) -> serde_json::Value {
        serde_json::from_str(response.headers()["hx-trigger"].to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_conflict_is_409_with_message() {
        let response =
            AppError::from(RepositoryError::Conflict("a product with this name already exists".into()))
                .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(
            trigger(&response)["showToast"]["description"]
                .as_str()
                .unwrap()
                .contains("already exists")
        );
    }

    #[test]
    fn test_server_errors_are_generic() {
        let response = AppError::Internal("pool exhausted".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            trigger(&response)["showToast"]["description"],
            "There was a problem with your request."
        );
    }

    #[test]
    fn test_permission_denied() {
        let err: AppError = PermissionError::new(
            &DocPath::Order {
                id: OrderId::new(9),
                owner: None,
            },
            Operation::Update,
            None,
        )
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(trigger(&response)["showToast"]["title"], "Permission Denied");
    }

    #[test]
    fn test_not_found() {
        assert_eq!(
            AppError::from(RepositoryError::NotFound).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
