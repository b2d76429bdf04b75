//! The admin gate.
//!
//! The session only says who signed in. [`RequireAdmin`] re-reads the
//! admin flag from `shop.admin_flag` on every request, so revoking access
//! takes effect on the next click.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use afrah_core::Toast;
use afrah_store::AdminRepository;

use crate::flash;
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

const LOGIN_PATH: &str = "/login";

/// Extractor that requires a signed-in user whose admin flag is set.
///
/// ```rust,ignore
/// async fn orders(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.display_name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Rejection for [`RequireAdmin`].
#[derive(Debug)]
pub enum AdminRejection {
    /// Not signed in, or no longer an admin. HTMX requests get
    /// `HX-Redirect` so the whole page navigates.
    Login { htmx: bool },
    /// The admin flag could not be read.
    Unavailable,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Login { htmx: true } => {
                let mut response = StatusCode::NO_CONTENT.into_response();
                response
                    .headers_mut()
                    .insert("hx-redirect", HeaderValue::from_static(LOGIN_PATH));
                response
            }
            Self::Login { htmx: false } => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }
}

/// The admin stored in the session, if any.
pub async fn session_admin(session: &Session) -> Option<CurrentAdmin> {
    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let htmx = parts.headers.contains_key("hx-request");
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminRejection::Login { htmx })?;
        let admin = session_admin(&session)
            .await
            .ok_or(AdminRejection::Login { htmx })?;

        let still_admin = AdminRepository::new(state.pool())
            .is_admin(admin.id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %admin.id, "failed to read admin flag");
                AdminRejection::Unavailable
            })?;

        if !still_admin {
            tracing::warn!(user_id = %admin.id, "admin access revoked, signing out");
            if let Err(e) = clear_current_admin(&session).await {
                tracing::warn!(error = %e, "failed to clear revoked admin");
            }
            if let Err(e) = flash::flash(&session, Toast::permission_denied()).await {
                tracing::warn!(error = %e, "failed to flash permission toast");
            }
            return Err(AdminRejection::Login { htmx });
        }

        Ok(Self(admin))
    }
}

/// Store the signed-in admin, rotating the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}
