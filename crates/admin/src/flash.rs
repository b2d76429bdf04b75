//! Toasts for the next page, or for an HTMX response.

use axum::{
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use afrah_core::Toast;

use crate::models::session_keys;

/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn flash(session: &Session, toast: Toast) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH_TOAST, toast).await
}

/// Remove and return the pending toast.
pub async fn take(session: &Session) -> Option<Toast> {
    session
        .remove::<Toast>(session_keys::FLASH_TOAST)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read flash toast");
            None
        })
}

/// Attach `toast` as an `HX-Trigger` `showToast` event.
pub fn with_toast(response: impl IntoResponse, toast: &Toast) -> Response {
    let mut response = response.into_response();
    if let Ok(value) = HeaderValue::from_str(&toast.hx_trigger()) {
        response.headers_mut().insert("hx-trigger", value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flash_taken_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        flash(&session, Toast::success("Product Created")).await.unwrap();
        assert_eq!(take(&session).await.unwrap().title, "Product Created");
        assert!(take(&session).await.is_none());
    }

    #[test]
    fn test_with_toast_header() {
        let response = with_toast("", &Toast::success("Success"));
        assert!(response.headers()["hx-trigger"].to_str().unwrap().contains("Success"));
    }
}
