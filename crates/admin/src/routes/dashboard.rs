//! Dashboard: counts, revenue, and the latest orders.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use tracing::instrument;

use afrah_store::rules::{DocPath, Operation};

use crate::error::Result;
use crate::fragments::Dashboard;
use crate::layout::Layout;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub dashboard: Dashboard,
    pub live_error: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// `GET /`
#[instrument(skip_all, fields(admin_id = %layout.admin.id))]
async fn index(State(state): State<AppState>, layout: Layout) -> Result<DashboardTemplate> {
    state
        .errors()
        .check(&layout.admin.actor(), &DocPath::Orders, Operation::List, None)?;
    Ok(DashboardTemplate {
        dashboard: Dashboard::load(state.pool()).await?,
        layout,
        live_error: None,
    })
}
