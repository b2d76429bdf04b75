//! Account page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use afrah_store::models::Order;
use afrah_store::rules::{DocPath, Operation};
use afrah_store::{OrderRepository, UserRepository};

use crate::error::{AppError, Result};
use crate::layout::Layout;
use crate::middleware::RequireAuth;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub layout: Layout,
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub initials: String,
    pub orders: Vec<Order>,
}

/// `GET /account` - profile and order history.
#[instrument(skip(state, layout, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    layout: Layout,
) -> Result<AccountTemplate> {
    let actor = user.actor();
    state
        .errors()
        .check(&actor, &DocPath::User(user.id), Operation::Get, None)?;
    let profile = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", user.id)))?;

    state
        .errors()
        .check(&actor, &DocPath::UserOrders(user.id), Operation::List, None)?;
    let orders = OrderRepository::new(state.pool()).list_for_user(user.id).await?;

    Ok(AccountTemplate {
        layout,
        initials: afrah_core::initials(&profile.display_name),
        display_name: profile.display_name,
        email: profile.email.to_string(),
        photo_url: profile.photo_url,
        orders,
    })
}
