//! HTTP middleware stack for the back-office.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Security headers
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Rate limiting on `POST /login` (governor)

pub mod auth;
pub mod rate_limit;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdmin, clear_current_admin, set_current_admin};
pub use rate_limit::login_rate_limiter;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
