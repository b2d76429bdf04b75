//! Sidebar chrome for signed-in back-office pages.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
};
use tower_sessions::Session;

use afrah_core::Toast;

use crate::flash;
use crate::middleware::RequireAdmin;
use crate::middleware::auth::AdminRejection;
use crate::models::CurrentAdmin;
use crate::state::AppState;

pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
}

pub const NAV_LINKS: [NavLink; 5] = [
    NavLink { href: "/", label: "Dashboard" },
    NavLink { href: "/orders", label: "Orders" },
    NavLink { href: "/products", label: "Products" },
    NavLink { href: "/users", label: "Users" },
    NavLink { href: "/messages", label: "Messages" },
];

/// Data every back-office page needs. Extracting it runs the admin gate.
pub struct Layout {
    pub admin: CurrentAdmin,
    pub toast: Option<Toast>,
    pub path: String,
    pub nav: &'static [NavLink],
}

impl Layout {
    /// `/` matches only itself; other links match their section.
    #[must_use]
    pub fn is_active(&self, href: &str) -> bool {
        if href == "/" {
            self.path == "/"
        } else {
            self.path.starts_with(href)
        }
    }
}

impl FromRequestParts<AppState> for Layout {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAdmin(admin) = RequireAdmin::from_request_parts(parts, state).await?;
        let toast = match parts.extensions.get::<Session>() {
            Some(session) => flash::take(session).await,
            None => None,
        };
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |OriginalUri(uri)| uri)
            .path()
            .to_owned();

        Ok(Self {
            admin,
            toast,
            path,
            nav: &NAV_LINKS,
        })
    }
}
