//! Order list and status changes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::Response,
    routing::{get, post},
};
use serde_json::json;
use tracing::instrument;

use afrah_core::{OrderId, Toast};
use afrah_store::OrderRepository;
use afrah_store::models::Order;
use afrah_store::rules::{DocPath, Operation};

use crate::error::{AppError, Result};
use crate::flash;
use crate::forms::StatusForm;
use crate::fragments::{OrdersFragment, load_orders};
use crate::layout::Layout;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "orders.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub orders: Vec<Order>,
    pub live_error: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/{id}/status", post(update_status))
}

/// `GET /orders` - newest first.
#[instrument(skip_all, fields(admin_id = %layout.admin.id))]
async fn index(State(state): State<AppState>, layout: Layout) -> Result<OrdersTemplate> {
    state
        .errors()
        .check(&layout.admin.actor(), &DocPath::Orders, Operation::List, None)?;
    Ok(OrdersTemplate {
        orders: load_orders(state.pool()).await?,
        layout,
        live_error: None,
    })
}

/// `POST /orders/{id}/status` (HTMX) - returns the refreshed table.
///
/// Cancelling puts the stock back; re-opening a cancelled order takes it
/// again.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let status = form.validate()?;
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    state.errors().check(
        &admin.actor(),
        &DocPath::Order {
            id,
            owner: order.user_id,
        },
        Operation::Update,
        Some(json!({ "status": status })),
    )?;
    orders.update_status(id, status).await?;

    let table = OrdersFragment {
        orders: load_orders(state.pool()).await?,
        live_error: None,
    };
    Ok(flash::with_toast(
        table,
        &Toast::success("Success").with_description(format!("Order status updated to {status}.")),
    ))
}
