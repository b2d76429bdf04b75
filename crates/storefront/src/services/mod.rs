//! Business logic that sits between handlers and repositories.

pub mod auth;
