//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Server errors are captured to
//! Sentry before the response is built; clients only ever see a generic
//! message for them.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use afrah_core::{Toast, ValidationErrors};
use afrah_store::{PermissionError, RepositoryError};

use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// An access rule rejected the action.
    #[error(transparent)]
    PermissionDenied(#[from] PermissionError),

    /// Form input failed validation.
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
            Self::Database(RepositoryError::InsufficientStock { .. }) => StatusCode::CONFLICT,
            Self::Database(RepositoryError::EmptyCart) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => err.status(),
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Toast shown to HTMX callers.
    fn toast(&self) -> Toast {
        match self {
            Self::PermissionDenied(_) => Toast::permission_denied(),
            Self::Validation(errors) => {
                let first = errors.iter().next().map_or("Please check the form.", |(_, m)| m);
                Toast::error("Uh oh! Something went wrong.").with_description(first)
            }
            Self::Auth(err) => Toast::error("Authentication Failed").with_description(err.user_message()),
            Self::NotFound(_) | Self::Database(RepositoryError::NotFound) => {
                Toast::error("Not found")
            }
            Self::BadRequest(message) => Toast::error("Error").with_description(message.clone()),
            Self::Database(err @ (RepositoryError::InsufficientStock { .. } | RepositoryError::EmptyCart)) => {
                Toast::error("Oh no! Something went wrong.").with_description(err.to_string())
            }
            _ => Toast::error("Uh oh! Something went wrong.")
                .with_description("There was a problem with your request."),
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
        }

        let status = self.status();
        let message = if self.is_server_error() {
            "Internal server error".to_owned()
        } else {
            match &self {
                Self::PermissionDenied(_) => "Permission denied".to_owned(),
                Self::Auth(err) => err.user_message().to_owned(),
                Self::Database(err) => err.to_string(),
                _ => self.to_string(),
            }
        };

        let mut response = (status, message).into_response();
        if let Ok(value) = HeaderValue::from_str(&self.toast().hx_trigger()) {
            response.headers_mut().insert("hx-trigger", value);
        }
        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Record a user action for the trail attached to Sentry reports.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb
            .data
            .insert((*key).to_owned(), serde_json::Value::String((*value).to_owned()));
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use afrah_core::ProductId;
    use afrah_store::rules::{DocPath, Operation};

    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status_of(AppError::NotFound("ajwa".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(RepositoryError::NotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(RepositoryError::EmptyCart.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(
                RepositoryError::InsufficientStock {
                    product: "Ajwa Dates".into(),
                    available: 1,
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(RepositoryError::DataCorruption("bad status".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthError::UserAlreadyExists.into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_permission_denied_is_forbidden_with_toast() {
        let err: AppError =
            PermissionError::new(&DocPath::Product(ProductId::new(3)), Operation::Update, None).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let trigger = response.headers().get("hx-trigger").unwrap().to_str().unwrap();
        let value: serde_json::Value = serde_json::from_str(trigger).unwrap();
        assert_eq!(value["showToast"]["title"], "Permission Denied");
        assert_eq!(value["showToast"]["variant"], "destructive");
    }

    #[test]
    fn test_validation_is_unprocessable_with_first_message() {
        let mut errors = ValidationErrors::new();
        errors.add("phone", "Please enter a valid Bangladeshi mobile number.");
        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let trigger = response.headers().get("hx-trigger").unwrap().to_str().unwrap();
        assert!(trigger.contains("Bangladeshi mobile number"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            AppError::NotFound("pure-gur".into()).to_string(),
            "Not found: pure-gur"
        );
    }
}
