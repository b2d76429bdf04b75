//! Afrah Organic Mart Core - Shared domain types.
//!
//! This crate provides the types shared by every Afrah component:
//! - `store` - Data access, access rules, and live snapshots
//! - `storefront` - Public-facing shop
//! - `admin` - Back-office for orders, products, users, and messages
//! - `cli` - Migrations, seeding, and admin-flag management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Anything that needs to agree between the shop and the
//! back-office (money formatting, order statuses, the category catalog, rating
//! arithmetic) lives here so both binaries render the same numbers.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email, phone, money, statuses, catalog, ratings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
