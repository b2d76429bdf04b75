//! HTTP route handlers for the back-office.
//!
//! # Route Structure
//!
//! ```text
//! GET  /login                     - Sign-in page
//! POST /login                     - Sign in (rate limited)
//! POST /logout                    - Sign out
//!
//! GET  /                          - Dashboard
//! GET  /orders                    - All orders, newest first
//! POST /orders/{id}/status        - Change status (HTMX)
//! GET  /products                  - Catalog
//! GET  /products/new              - Add form
//! POST /products                  - Create
//! GET  /products/{id}/edit        - Edit form
//! POST /products/{id}             - Update
//! POST /products/{id}/delete      - Delete (HTMX)
//! GET  /users                     - Users and roles
//! POST /users/{id}/admin          - Grant or revoke admin (HTMX)
//! GET  /messages                  - Contact messages
//! POST /messages/{id}/delete      - Delete (HTMX)
//!
//! # Live views (SSE)
//! GET  /live/dashboard, /live/orders, /live/users, /live/messages
//! ```
//!
//! Everything except `/login` goes through the admin gate.

pub mod auth;
pub mod dashboard;
pub mod live;
pub mod messages;
pub mod orders;
pub mod products;
pub mod users;

use axum::{Router, http::StatusCode};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(orders::router())
        .merge(products::router())
        .merge(users::router())
        .merge(messages::router())
        .merge(live::router())
        .fallback(not_found)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header::LOCATION};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use afrah_store::ErrorBus;
    use afrah_store::live::ChangeFeed;

    use super::*;
    use crate::config::AdminConfig;

    /// A router whose pool never connects; only paths that stop before the
    /// database can be exercised.
    fn app() -> Router {
        let config = AdminConfig {
            database_url: SecretString::from("postgres://afrah@localhost/afrah"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_owned(),
            session_secret: SecretString::from("Zx7!pQ2@mN9#kL4$wR6^tY8&uI0*oP3%"),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://afrah@localhost/afrah")
            .unwrap();
        let state = AppState::new(config, pool, ChangeFeed::new(8), ErrorBus::new());
        routes()
            .layer(SessionManagerLayer::new(MemoryStore::default()))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_login_page_renders() {
        let response = app()
            .oneshot(Request::get("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_signed_out_is_sent_to_login() {
        for uri in ["/", "/orders", "/products", "/products/new", "/users", "/messages", "/live/orders"] {
            let response = app()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(response.headers()[LOCATION], "/login", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_signed_out_htmx_action_gets_hx_redirect() {
        let request = Request::post("/orders/4/status")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("hx-request", "true")
            .body(Body::from("status=Shipped"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["hx-redirect"], "/login");
    }

    #[tokio::test]
    async fn test_invalid_login_rerenders_with_errors() {
        let request = Request::post("/login")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("x-forwarded-for", "198.51.100.20")
            .body(Body::from("email=owner&password=123"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("Please enter a valid email address."));
        assert!(html.contains("Password must be at least 6 characters."));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = app()
            .oneshot(Request::get("/chat").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
