//! Business logic for the back-office.

pub mod auth;
