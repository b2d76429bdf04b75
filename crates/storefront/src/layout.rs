//! Per-page chrome: header, footer, toast.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
};
use tower_sessions::Session;

use afrah_core::{CATEGORIES, Category, Toast};
use afrah_store::CartRepository;

use crate::content::SiteInfo;
use crate::flash;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Data every full page needs.
pub struct Layout {
    pub site: SiteInfo,
    pub user: Option<CurrentUser>,
    /// Units in the signed-in user's cart.
    pub cart_count: i64,
    /// Toast flashed by the previous request.
    pub toast: Option<Toast>,
    pub categories: &'static [Category],
    /// Request path, for highlighting the active nav link.
    pub path: String,
}

impl Layout {
    #[must_use]
    pub fn is_active(&self, href: &str) -> bool {
        if href == "/" {
            self.path == "/"
        } else {
            self.path.starts_with(href)
        }
    }

    #[must_use]
    pub fn is_category_active(&self, slug: &str) -> bool {
        self.path
            .strip_prefix("/category/")
            .is_some_and(|rest| rest == slug)
    }

    #[must_use]
    pub fn user_initials(&self) -> String {
        self.user.as_ref().map(CurrentUser::initials).unwrap_or_default()
    }
}

impl FromRequestParts<AppState> for Layout {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state).await?;

        let toast = match parts.extensions.get::<Session>() {
            Some(session) => flash::take(session).await,
            None => None,
        };

        let cart_count = match &user {
            Some(user) => CartRepository::new(state.pool())
                .count(user.id)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "failed to count cart");
                    0
                }),
            None => 0,
        };

        Ok(Self {
            site: state.site().clone(),
            user,
            cart_count,
            toast,
            categories: &CATEGORIES,
            path: parts
                .extensions
                .get::<OriginalUri>()
                .map_or(&parts.uri, |OriginalUri(uri)| uri)
                .path()
                .to_owned(),
        })
    }
}
