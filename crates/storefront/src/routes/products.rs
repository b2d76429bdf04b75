//! Shop listing, product detail, "buy now" orders, and ratings.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use afrah_core::{PaymentMethod, Toast, ValidationErrors, clamp_quantity};
use afrah_store::models::{OrderLine, Product};
use afrah_store::rules::{DocPath, Operation};
use afrah_store::{OrderRepository, ProductRepository, RatingRepository, RepositoryError};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::flash;
use crate::forms::{OrderForm, RateForm};
use crate::layout::Layout;
use crate::middleware::RequireAuth;
use crate::models::actor_of;
use crate::state::AppState;
use crate::views::{ProductCard, RatingView, wishlist_ids};

/// Product grid for `/shop` and category pages.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductListTemplate {
    pub layout: Layout,
    pub title: String,
    pub subtitle: String,
    pub cards: Vec<ProductCard>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub layout: Layout,
    pub card: ProductCard,
    pub rating: RatingView,
    pub quantity: i32,
    pub total: String,
    pub form: OrderForm,
    pub errors: ValidationErrors,
    pub payment_methods: [PaymentMethod; 4],
}

/// Order total next to the quantity input (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/order_total.html")]
pub struct OrderTotalTemplate {
    pub total: String,
}

/// Star widget (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/rating.html")]
pub struct RatingTemplate {
    pub rating: RatingView,
}

#[derive(Debug, Deserialize)]
pub struct QuantityQuery {
    pub quantity: Option<i32>,
}

/// Load a product by slug or fail with 404.
pub(crate) async fn find_product(state: &AppState, slug: &str) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))
}

/// `GET /shop`
#[instrument(skip(state, layout))]
pub async fn index(State(state): State<AppState>, layout: Layout) -> Result<ProductListTemplate> {
    let products = ProductRepository::new(state.pool()).list().await?;
    let wishlist = wishlist_ids(state.pool(), layout.user.as_ref()).await;

    Ok(ProductListTemplate {
        layout,
        title: "All Products".to_owned(),
        subtitle: "Browse our full range of organic goods.".to_owned(),
        cards: ProductCard::list(products, &wishlist),
    })
}

async fn render_product(
    state: &AppState,
    layout: Layout,
    product: Product,
    form: OrderForm,
    errors: ValidationErrors,
) -> Result<ProductTemplate> {
    let user_id = layout.user.as_ref().map(|u| u.id);
    let mine = match user_id {
        Some(uid) => RatingRepository::new(state.pool()).get(product.id, uid).await?,
        None => None,
    };
    let wishlist = wishlist_ids(state.pool(), layout.user.as_ref()).await;
    let quantity = clamp_quantity(form.quantity.unwrap_or(1), product.stock);
    let total = (product.price * quantity.max(1)).display();

    let rating = RatingView {
        slug: product.slug.clone(),
        aggregate: product.rating(),
        mine,
        signed_in: user_id.is_some(),
    };
    let card = ProductCard::list(vec![product], &wishlist)
        .pop()
        .ok_or_else(|| AppError::Internal("product card missing".to_owned()))?;

    Ok(ProductTemplate {
        layout,
        card,
        rating,
        quantity,
        total,
        form,
        errors,
        payment_methods: PaymentMethod::ALL,
    })
}

/// `GET /product/{slug}`
#[instrument(skip(state, layout))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    Path(slug): Path<String>,
) -> Result<ProductTemplate> {
    let product = find_product(&state, &slug).await?;
    render_product(&state, layout, product, OrderForm::blank(), ValidationErrors::new()).await
}

/// `GET /product/{slug}/total?quantity=N` - price times the clamped quantity.
#[instrument(skip(state))]
pub async fn total(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<QuantityQuery>,
) -> Result<OrderTotalTemplate> {
    let product = find_product(&state, &slug).await?;
    let quantity = clamp_quantity(query.quantity.unwrap_or(1), product.stock).max(1);
    Ok(OrderTotalTemplate {
        total: (product.price * quantity).display(),
    })
}

/// `POST /product/{slug}/order` - "buy now". Guests may order.
#[instrument(skip(state, session, layout, form))]
pub async fn order(
    State(state): State<AppState>,
    session: Session,
    mut layout: Layout,
    Path(slug): Path<String>,
    Form(form): Form<OrderForm>,
) -> Result<Response> {
    let product = find_product(&state, &slug).await?;
    let quantity = clamp_quantity(form.quantity.unwrap_or(1), product.stock);
    if quantity == 0 {
        return Err(AppError::BadRequest(format!("{} is out of stock.", product.name)));
    }

    let user = layout.user.as_ref();
    let new_order = match form.validate(user.map(|u| u.id)) {
        Ok(new_order) => new_order,
        Err(errors) => {
            let page = render_product(&state, layout, product, form, errors).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    state.errors().check(
        &actor_of(user),
        &DocPath::Orders,
        Operation::Create,
        Some(json!({ "productId": product.id, "quantity": quantity })),
    )?;

    let line = OrderLine {
        product_id: product.id,
        quantity,
    };
    match OrderRepository::new(state.pool()).place(&new_order, &[line]).await {
        Ok(placed) => {
            let order_id = placed.id.to_string();
            add_breadcrumb("order", "Order placed", Some(&[("order_id", order_id.as_str())]));
            flash::flash(
                &session,
                Toast::success("Order Placed!")
                    .with_description("We've received your order and will process it shortly."),
            )
            .await?;
            Ok(Redirect::to(&format!("/product/{slug}")).into_response())
        }
        Err(e @ RepositoryError::InsufficientStock { .. }) => {
            layout.toast = Some(
                Toast::error("Oh no! Something went wrong.").with_description(e.to_string()),
            );
            let page =
                render_product(&state, layout, product, form, ValidationErrors::new()).await?;
            Ok((StatusCode::CONFLICT, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `POST /product/{slug}/rate` (HTMX) - returns the updated star widget.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn rate(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(slug): Path<String>,
    Form(form): Form<RateForm>,
) -> Result<Response> {
    let stars = form.validate()?;
    let product = find_product(&state, &slug).await?;

    state.errors().check(
        &user.actor(),
        &DocPath::ProductRatings(product.id),
        Operation::Write,
        Some(json!({ "stars": stars.get() })),
    )?;

    let aggregate = RatingRepository::new(state.pool())
        .rate(product.id, user.id, stars)
        .await?;

    let widget = RatingTemplate {
        rating: RatingView {
            slug: product.slug,
            aggregate,
            mine: Some(stars),
            signed_in: true,
        },
    };
    Ok(flash::with_toast(widget, &Toast::success("Thanks for rating!")))
}
