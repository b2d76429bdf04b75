//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::Response,
};
use serde::Deserialize;
use tracing::instrument;

use afrah_core::{ProductId, Toast};
use afrah_store::WishlistRepository;
use afrah_store::rules::{DocPath, Operation};

use crate::error::Result;
use crate::flash;
use crate::layout::Layout;
use crate::middleware::RequireAuth;
use crate::state::AppState;
use crate::views::{ProductCard, WishlistButton};

#[derive(Template, WebTemplate)]
#[template(path = "wishlist.html")]
pub struct WishlistTemplate {
    pub layout: Layout,
    pub cards: Vec<ProductCard>,
}

/// Heart button (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_button.html")]
pub struct WishlistButtonTemplate {
    pub button: WishlistButton,
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: ProductId,
}

/// `GET /wishlist` - most recently added first.
#[instrument(skip(state, layout, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    layout: Layout,
) -> Result<WishlistTemplate> {
    state
        .errors()
        .check(&user.actor(), &DocPath::Wishlist(user.id), Operation::List, None)?;
    let products = WishlistRepository::new(state.pool()).products(user.id).await?;
    let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();

    Ok(WishlistTemplate {
        layout,
        cards: ProductCard::list(products, &ids),
    })
}

/// `POST /wishlist/toggle` (HTMX) - add when absent, remove when present.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ToggleForm>,
) -> Result<Response> {
    state.errors().check(
        &user.actor(),
        &DocPath::WishlistItem(user.id, form.product_id),
        Operation::Write,
        None,
    )?;

    let wishlisted = WishlistRepository::new(state.pool())
        .toggle(user.id, form.product_id)
        .await?;

    let toast = if wishlisted {
        Toast::success("Added to wishlist.")
    } else {
        Toast::success("Removed from wishlist.")
    };
    let button = WishlistButtonTemplate {
        button: WishlistButton {
            product_id: form.product_id,
            wishlisted,
        },
    };
    Ok(flash::with_toast(button, &toast))
}
