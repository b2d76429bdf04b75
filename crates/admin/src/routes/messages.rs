//! Contact form inbox.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    response::Response,
    routing::{get, post},
};
use tracing::instrument;

use afrah_core::{MessageId, Toast};
use afrah_store::ContactRepository;
use afrah_store::models::ContactMessage;
use afrah_store::rules::{DocPath, Operation};

use crate::error::Result;
use crate::flash;
use crate::fragments::{MessagesFragment, load_messages};
use crate::layout::Layout;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "messages.html")]
pub struct MessagesTemplate {
    pub layout: Layout,
    pub messages: Vec<ContactMessage>,
    pub live_error: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(index))
        .route("/messages/{id}/delete", post(delete))
}

/// `GET /messages` - newest first.
#[instrument(skip_all, fields(admin_id = %layout.admin.id))]
async fn index(State(state): State<AppState>, layout: Layout) -> Result<MessagesTemplate> {
    state
        .errors()
        .check(&layout.admin.actor(), &DocPath::Contacts, Operation::List, None)?;
    Ok(MessagesTemplate {
        messages: load_messages(state.pool()).await?,
        layout,
        live_error: None,
    })
}

/// `POST /messages/{id}/delete` (HTMX)
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<MessageId>,
) -> Result<Response> {
    state
        .errors()
        .check(&admin.actor(), &DocPath::Contact(id), Operation::Delete, None)?;
    let message = ContactRepository::new(state.pool()).delete(id).await?;

    let list = MessagesFragment {
        messages: load_messages(state.pool()).await?,
        live_error: None,
    };
    Ok(flash::with_toast(
        list,
        &Toast::success("Message Deleted")
            .with_description(format!("The message from \"{}\" has been deleted.", message.name)),
    ))
}
