//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /shop                      - All products, newest first
//! GET  /category/{slug}           - Products in one category
//! GET  /product/{slug}            - Product detail with "buy now" form
//! GET  /product/{slug}/total      - Order total for a quantity (HTMX)
//! POST /product/{slug}/order      - Place a single-product order
//! POST /product/{slug}/rate       - Rate 1-5 stars (HTMX, signed in)
//! GET  /search?q=                 - Search dropdown (HTMX)
//!
//! # Cart (signed in)
//! GET  /cart                      - Cart page with checkout form
//! POST /cart/add                  - Add a product (HTMX, fires cartUpdated)
//! POST /cart/remove               - Remove a line (HTMX, returns cart contents)
//! GET  /cart/count                - Header badge (HTMX)
//! POST /cart/checkout             - One order for the whole cart
//!
//! # Wishlist (signed in)
//! GET  /wishlist                  - Wishlisted products
//! POST /wishlist/toggle           - Add or remove (HTMX)
//!
//! # Contact
//! GET  /contact                   - Contact page
//! POST /contact                   - Send a message
//!
//! # Auth
//! GET  /login                     - Sign-in and sign-up forms
//! POST /login                     - Sign in
//! POST /signup                    - Create an account and sign in
//! POST /logout                    - Sign out
//! GET  /account                   - Profile and orders (signed in)
//!
//! # Pages
//! GET  /about, /faq, /privacy-policy, /refund-policy, /terms-conditions
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod contact;
pub mod home;
pub mod pages;
pub mod products;
pub mod search;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, form_rate_limiter};
use crate::state::AppState;

/// Catalog browsing and "buy now".
pub fn product_routes() -> Router<AppState> {
    let orders = Router::new()
        .route("/product/{slug}/order", post(products::order))
        .route_layer(form_rate_limiter());

    Router::new()
        .route("/shop", get(products::index))
        .route("/category/{slug}", get(categories::show))
        .route("/product/{slug}", get(products::show))
        .route("/product/{slug}/total", get(products::total))
        .route("/product/{slug}/rate", post(products::rate))
        .route("/search", get(search::search))
        .merge(orders)
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    let checkout = Router::new()
        .route("/checkout", post(cart::checkout))
        .route_layer(form_rate_limiter());

    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .merge(checkout)
}

pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
}

/// Sign-in, sign-up, and the contact form. POSTs are rate limited.
pub fn form_routes() -> Router<AppState> {
    let auth_posts = Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route_layer(auth_rate_limiter());
    let contact_post = Router::new()
        .route("/contact", post(contact::submit))
        .route_layer(form_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/logout", post(auth::logout))
        .route("/account", get(account::index))
        .route("/contact", get(contact::show))
        .merge(auth_posts)
        .merge(contact_post)
}

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/about", get(pages::about))
        .route("/faq", get(pages::faq))
        .route("/privacy-policy", get(pages::privacy_policy))
        .route("/refund-policy", get(pages::refund_policy))
        .route("/terms-conditions", get(pages::terms_conditions))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(product_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .merge(form_routes())
        .merge(page_routes())
        .fallback(pages::not_found)
}
