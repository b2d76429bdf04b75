//! Cart route handlers.
//!
//! The cart lives in `shop.cart_item` and needs a signed-in customer.
//! Adding and removing use HTMX; the header badge refreshes on the
//! `cartUpdated` event.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use afrah_core::{CartItemId, PaymentMethod, ProductId, Toast, ValidationErrors};
use afrah_store::models::{CartLine, cart_total};
use afrah_store::rules::{DocPath, Operation};
use afrah_store::{CartRepository, ProductRepository};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::flash;
use crate::forms::OrderForm;
use crate::layout::Layout;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Client event that refreshes the header badge.
const CART_UPDATED: &str = "cartUpdated";

/// Cart lines, total, and the checkout form.
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: String,
    pub form: OrderForm,
    pub errors: ValidationErrors,
    pub payment_methods: [PaymentMethod; 4],
}

impl CartView {
    fn new(lines: Vec<CartLine>, form: OrderForm, errors: ValidationErrors) -> Self {
        Self {
            total: cart_total(&lines).display(),
            lines,
            form,
            errors,
            payment_methods: PaymentMethod::ALL,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Everything inside `#cart-contents` (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_contents.html")]
pub struct CartContentsTemplate {
    pub cart: CartView,
}

/// Header badge (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub cart_item_id: CartItemId,
}

/// A blank checkout form with the customer's name filled in.
fn checkout_form(user: &CurrentUser) -> OrderForm {
    OrderForm {
        name: user.display_name.clone(),
        ..OrderForm::blank()
    }
}

async fn load_lines(state: &AppState, user: &CurrentUser) -> Result<Vec<CartLine>> {
    state
        .errors()
        .check(&user.actor(), &DocPath::Cart(user.id), Operation::List, None)?;
    Ok(CartRepository::new(state.pool()).list(user.id).await?)
}

/// `GET /cart`
#[instrument(skip(state, layout, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    layout: Layout,
) -> Result<CartTemplate> {
    let lines = load_lines(&state, &user).await?;
    Ok(CartTemplate {
        layout,
        cart: CartView::new(lines, checkout_form(&user), ValidationErrors::new()),
    })
}

/// `POST /cart/add` (HTMX) - adding a product already in the cart bumps
/// its quantity.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(form.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;
    if !product.in_stock() {
        return Err(AppError::BadRequest(format!("{} is out of stock.", product.name)));
    }

    let quantity = form.quantity.unwrap_or(1).max(1);
    state.errors().check(
        &user.actor(),
        &DocPath::Cart(user.id),
        Operation::Create,
        Some(json!({ "productId": product.id, "quantity": quantity })),
    )?;

    CartRepository::new(state.pool())
        .add(user.id, product.id, quantity)
        .await?;

    let product_id = product.id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));
    let toast = Toast::success("Added to cart!")
        .with_description(format!("{} has been added to your cart.", product.name));
    Ok(flash::with_toast_events(StatusCode::NO_CONTENT, &toast, &[CART_UPDATED]))
}

/// `POST /cart/remove` (HTMX) - returns the refreshed cart contents.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    state.errors().check(
        &user.actor(),
        &DocPath::CartItem(user.id, form.cart_item_id),
        Operation::Delete,
        None,
    )?;
    CartRepository::new(state.pool())
        .remove(user.id, form.cart_item_id)
        .await?;

    let lines = load_lines(&state, &user).await?;
    let contents = CartContentsTemplate {
        cart: CartView::new(lines, checkout_form(&user), ValidationErrors::new()),
    };
    Ok(flash::with_toast_events(
        contents,
        &Toast::success("Item removed from cart."),
        &[CART_UPDATED],
    ))
}

/// `GET /cart/count` (HTMX) - zero when signed out.
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<CartCountTemplate> {
    let count = match user {
        Some(user) => CartRepository::new(state.pool()).count(user.id).await?,
        None => 0,
    };
    Ok(CartCountTemplate { count })
}

/// `POST /cart/checkout` - one order for the whole cart, then an empty cart.
#[instrument(skip(state, session, layout, user, form), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    layout: Layout,
    Form(form): Form<OrderForm>,
) -> Result<Response> {
    let new_order = match form.validate(Some(user.id)) {
        Ok(new_order) => new_order,
        Err(errors) => {
            let lines = load_lines(&state, &user).await?;
            let page = CartTemplate {
                layout,
                cart: CartView::new(lines, form, errors),
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    state.errors().check(
        &user.actor(),
        &DocPath::Orders,
        Operation::Create,
        Some(json!({
            "customerName": new_order.customer_name,
            "paymentMethod": new_order.payment_method,
            "userId": user.id,
        })),
    )?;

    let order = CartRepository::new(state.pool())
        .checkout(user.id, &new_order)
        .await?;
    let order_id = order.id.to_string();
    add_breadcrumb("order", "Cart checked out", Some(&[("order_id", order_id.as_str())]));

    flash::flash(
        &session,
        Toast::success("Order Placed!")
            .with_description("We've received your order and will process it shortly."),
    )
    .await?;
    Ok(Redirect::to("/cart").into_response())
}
