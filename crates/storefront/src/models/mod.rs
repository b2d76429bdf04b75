//! Session-held models.

pub mod session;

pub use session::{CurrentUser, actor_of, keys as session_keys};
