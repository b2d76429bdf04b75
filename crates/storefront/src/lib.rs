//! Afrah Organic Mart storefront library.
//!
//! The customer-facing shop: catalog, cart, wishlist, checkout, contact
//! form, and customer accounts. The binary in `main.rs` wires this into an
//! axum server; tests drive the router directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod content;
pub mod error;
pub mod flash;
pub mod forms;
pub mod layout;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod search;
pub mod services;
pub mod state;
pub mod views;
