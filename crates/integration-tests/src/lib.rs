//! Integration tests for Afrah Organic Mart.
//!
//! # Running Tests
//!
//! ```bash
//! # Repository tests need only the database
//! DATABASE_URL=postgres://... cargo test -p afrah-integration-tests -- --ignored store_
//!
//! # HTTP tests also need both servers running against the same database
//! cargo run -p afrah-storefront &
//! cargo run -p afrah-admin &
//! cargo test -p afrah-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `store_*` - repositories and the change feed against `PostgreSQL`
//! - `storefront_http` - the shop over HTTP
//! - `admin_http` - the back-office over HTTP
//!
//! Every fixture uses a fresh random email or product name, so tests can
//! share one database and run in parallel.

#![allow(clippy::missing_panics_doc)]

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use reqwest::Client;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use afrah_core::{Email, PaymentMethod, Phone, Taka, UserId};
use afrah_store::models::{NewOrder, Product, ProductInput, UserProfile};
use afrah_store::{ProductRepository, UserRepository};

/// Password given to every fixture account.
pub const TEST_PASSWORD: &str = "correct-horse";

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Base URL for the back-office (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_owned())
}

/// Connect to `DATABASE_URL` and bring the schema up to date.
pub async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = afrah_store::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database");
    afrah_store::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// HTTP client that keeps cookies and does not follow redirects.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A random address nobody else will use.
#[must_use]
pub fn unique_email(prefix: &str) -> Email {
    Email::parse(&format!("{prefix}-{}@example.com", Uuid::new_v4().simple()))
        .expect("generated email is valid")
}

/// Create an account whose password is [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, display_name: &str) -> UserProfile {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(TEST_PASSWORD.as_bytes(), &salt)
        .expect("Failed to hash password")
        .to_string();
    UserRepository::new(pool)
        .create_with_password(display_name, &unique_email("user"), &hash)
        .await
        .expect("Failed to create user")
}

/// Create a product with a unique name and the given stock.
pub async fn create_product(pool: &PgPool, price: i64, stock: i32) -> Product {
    let name = format!("Test Dates {}", Uuid::new_v4().simple());
    ProductRepository::new(pool)
        .create(&ProductInput {
            name,
            description: "Fixture product for integration tests.".to_owned(),
            category: "Dates".to_owned(),
            images: vec!["https://placehold.co/600x600".to_owned()],
            price: Taka::from_whole(price),
            original_price: None,
            stock,
            is_new: false,
        })
        .await
        .expect("Failed to create product")
}

/// Re-read a product.
pub async fn reload(pool: &PgPool, product: &Product) -> Product {
    ProductRepository::new(pool)
        .get_by_id(product.id)
        .await
        .expect("Failed to load product")
        .expect("product exists")
}

/// A cash-on-delivery order for `user_id`.
#[must_use]
pub fn new_order(user_id: Option<UserId>) -> NewOrder {
    NewOrder {
        user_id,
        customer_name: "Test Customer".to_owned(),
        address: "House 12, Road 4, Dhanmondi, Dhaka".to_owned(),
        phone: Phone::parse("01712345678").expect("valid phone"),
        payment_method: PaymentMethod::Cod,
    }
}
