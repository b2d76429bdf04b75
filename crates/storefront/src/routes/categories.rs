//! Category pages.

use axum::extract::{Path, State};
use tracing::instrument;

use afrah_core::Category;
use afrah_store::ProductRepository;

use crate::error::{AppError, Result};
use crate::layout::Layout;
use crate::routes::products::ProductListTemplate;
use crate::state::AppState;
use crate::views::{ProductCard, wishlist_ids};

/// `GET /category/{slug}` - newest first; unknown slugs are 404.
#[instrument(skip(state, layout))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    Path(slug): Path<String>,
) -> Result<ProductListTemplate> {
    let category =
        Category::by_slug(&slug).ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    let products = ProductRepository::new(state.pool())
        .list_by_category(category.name)
        .await?;
    let wishlist = wishlist_ids(state.pool(), layout.user.as_ref()).await;

    Ok(ProductListTemplate {
        layout,
        title: category.name.to_owned(),
        subtitle: format!("Explore our collection of premium {}.", category.name.to_lowercase()),
        cards: ProductCard::list(products, &wishlist),
    })
}
