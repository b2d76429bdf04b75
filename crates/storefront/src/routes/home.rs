//! Home page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use afrah_core::{CATEGORIES, Category};
use afrah_store::ProductRepository;

use crate::content::{TESTIMONIALS, Testimonial};
use crate::error::Result;
use crate::layout::Layout;
use crate::state::AppState;
use crate::views::{ProductCard, wishlist_ids};

/// Best sellers shown on the home page.
const BEST_SELLER_COUNT: i64 = 4;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub categories: &'static [Category],
    pub best_sellers: Vec<ProductCard>,
    pub testimonials: &'static [Testimonial],
}

/// `GET /`
#[instrument(skip(state, layout))]
pub async fn home(State(state): State<AppState>, layout: Layout) -> Result<HomeTemplate> {
    let products = ProductRepository::new(state.pool())
        .best_sellers(BEST_SELLER_COUNT)
        .await?;
    let wishlist = wishlist_ids(state.pool(), layout.user.as_ref()).await;

    Ok(HomeTemplate {
        layout,
        categories: &CATEGORIES,
        best_sellers: ProductCard::list(products, &wishlist),
        testimonials: TESTIMONIALS,
    })
}
