//! Toast delivery.
//!
//! Full-page flows store the toast in the session and the next rendered
//! page shows it. HTMX fragment responses carry it in `HX-Trigger` instead.

use axum::{
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use afrah_core::Toast;

use crate::models::session_keys;

/// Show `toast` on the next page.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn flash(session: &Session, toast: Toast) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH_TOAST, toast).await
}

/// Remove and return the pending toast. Session errors count as none.
pub async fn take(session: &Session) -> Option<Toast> {
    match session.remove::<Toast>(session_keys::FLASH_TOAST).await {
        Ok(toast) => toast,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read flash toast");
            None
        }
    }
}

/// Attach `toast` to a response as an `HX-Trigger` `showToast` event.
pub fn with_toast(response: impl IntoResponse, toast: &Toast) -> Response {
    with_toast_events(response, toast, &[])
}

/// Attach `toast` plus extra client events, such as `cartUpdated`.
pub fn with_toast_events(response: impl IntoResponse, toast: &Toast, events: &[&str]) -> Response {
    let mut response = response.into_response();
    if let Ok(value) = HeaderValue::from_str(&toast.hx_trigger_with(events)) {
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
    async fn test_flash_is_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        flash(&session, Toast::success("Message Sent!")).await.unwrap();
        assert_eq!(take(&session).await.unwrap().title, "Message Sent!");
        assert!(take(&session).await.is_none());
    }

    #[test]
    fn test_with_toast_sets_trigger() {
        let response = with_toast("ok", &Toast::success("Removed from wishlist."));
        let trigger = response.headers()["hx-trigger"].to_str().unwrap();
        assert!(trigger.starts_with(r#"{"showToast""#));
        assert!(trigger.contains("Removed from wishlist."));
    }
}
