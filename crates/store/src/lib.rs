//! Afrah Organic Mart Store - data access shared by the shop and back-office.
//!
//! # Database
//!
//! Both binaries use one `PostgreSQL` database. Shop data lives in the `shop`
//! schema; sessions live in `tower_sessions.session`.
//!
//! ## Tables
//!
//! - `product` - Catalog, with the running rating sum/count and sales
//! - `customer_order`, `order_item` - Orders and their lines
//! - `contact_message` - Contact form submissions
//! - `user_account` - Customer profiles and password hashes
//! - `admin_flag` - Back-office access
//! - `cart_item`, `wishlist_item` - Per-user collections
//! - `product_rating` - One rating per user per product
//!
//! Every table has a row trigger that publishes on the `shop_changes`
//! channel; see [`live`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/store/migrations/` and run via:
//! ```bash
//! cargo run -p afrah-cli -- migrate
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admins;
pub mod cart;
pub mod contacts;
pub mod errors;
pub mod live;
pub mod models;
pub mod orders;
pub mod products;
pub mod ratings;
pub mod rules;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admins::AdminRepository;
pub use cart::CartRepository;
pub use contacts::ContactRepository;
pub use errors::{ErrorBus, PermissionError};
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use ratings::RatingRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or slug).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Not enough stock to fill an order line.
    #[error("only {available} of \"{product}\" left in stock")]
    InsufficientStock {
        /// Product name.
        product: String,
        /// Units on hand.
        available: i32,
    },

    /// Checkout was attempted with an empty cart.
    #[error("cart is empty")]
    EmptyCart,
}

impl RepositoryError {
    /// Map a unique violation to [`RepositoryError::Conflict`].
    pub(crate) fn from_unique(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
