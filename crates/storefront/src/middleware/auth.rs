//! Sign-in extractors.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{HeaderValue, Method, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Where a signed-out visitor lands after signing in when they were
/// submitting a form rather than viewing a page.
const FORM_RETURN_PATH: &str = "/shop";

/// Extractor that requires a signed-in customer.
///
/// Signed-out visitors are sent to `/login?redirect=...`. HTMX requests get
/// an `HX-Redirect` header instead of a 303 so the whole page navigates.
pub struct RequireAuth(pub CurrentUser);

/// Rejection for [`RequireAuth`].
#[derive(Debug)]
pub struct LoginRedirect {
    to: String,
    htmx: bool,
}

impl LoginRedirect {
    fn for_request(parts: &Parts) -> Self {
        let back = if parts.method == Method::GET {
            // Nested routers see a stripped URI; the original keeps the prefix.
            let uri = parts
                .extensions
                .get::<OriginalUri>()
                .map_or(&parts.uri, |OriginalUri(uri)| uri);
            uri.path_and_query().map_or("/", |pq| pq.as_str()).to_owned()
        } else {
            FORM_RETURN_PATH.to_owned()
        };
        Self {
            to: format!("/login?redirect={}", urlencoding::encode(&back)),
            htmx: parts.headers.contains_key("hx-request"),
        }
    }
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        if self.htmx {
            let mut response = StatusCode::NO_CONTENT.into_response();
            if let Ok(value) = HeaderValue::from_str(&self.to) {
                response.headers_mut().insert("hx-redirect", value);
            }
            response
        } else {
            Redirect::to(&self.to).into_response()
        }
    }
}

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| LoginRedirect::for_request(parts))
    }
}

/// Extractor for pages that work signed in or out.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

/// Store the signed-in user, rotating the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Forget the signed-in user.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Request, header::LOCATION};

    use super::*;

    fn parts(method: Method, uri: &str, htmx: bool) -> Parts {
        let mut builder = Request::builder().method(method).uri(uri);
        if htmx {
            builder = builder.header("hx-request", "true");
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_page_redirect_returns_to_page() {
        let response = LoginRedirect::for_request(&parts(Method::GET, "/account", false)).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/login?redirect=%2Faccount");
    }

    #[test]
    fn test_form_redirect_returns_to_shop() {
        let response = LoginRedirect::for_request(&parts(Method::POST, "/cart/add", true)).into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["hx-redirect"], "/login?redirect=%2Fshop");
    }

    #[tokio::test]
    async fn test_missing_session_is_signed_out() {
        let mut p = parts(Method::GET, "/wishlist", false);
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut p, &()).await.unwrap();
        assert!(user.is_none());
        assert!(RequireAuth::from_request_parts(&mut p, &()).await.is_err());
    }
}
