//! Users and their admin flag.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    response::Response,
    routing::{get, post},
};
use serde_json::json;
use tracing::instrument;

use afrah_core::{Toast, UserId};
use afrah_store::rules::{DocPath, Operation};
use afrah_store::{AdminRepository, UserRepository};

use crate::error::{AppError, Result};
use crate::flash;
use crate::fragments::{UserRow, UsersFragment, load_users};
use crate::layout::Layout;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub layout: Layout,
    pub users: Vec<UserRow>,
    pub me: UserId,
    pub live_error: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(index))
        .route("/users/{id}/admin", post(toggle_admin))
}

/// `GET /users`
#[instrument(skip_all, fields(admin_id = %layout.admin.id))]
async fn index(State(state): State<AppState>, layout: Layout) -> Result<UsersTemplate> {
    state
        .errors()
        .check(&layout.admin.actor(), &DocPath::Users, Operation::List, None)?;
    Ok(UsersTemplate {
        users: load_users(state.pool()).await?,
        me: layout.admin.id,
        layout,
        live_error: None,
    })
}

/// `POST /users/{id}/admin` (HTMX) - grant or revoke, returning the
/// refreshed table.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
async fn toggle_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Response> {
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
    let admins = AdminRepository::new(state.pool());
    let is_admin = admins.is_admin(id).await?;

    if is_admin && id == admin.id {
        return Err(AppError::BadRequest(
            "You cannot remove your own admin access.".to_owned(),
        ));
    }

    let path = DocPath::Admin(id);
    let toast = if is_admin {
        state
            .errors()
            .check(&admin.actor(), &path, Operation::Delete, None)?;
        admins.revoke_admin(id).await?;
        Toast::success("Admin Removed")
            .with_description(format!("{} is no longer an admin.", user.display_name))
    } else {
        state.errors().check(
            &admin.actor(),
            &path,
            Operation::Write,
            Some(json!({ "isAdmin": true })),
        )?;
        admins.set_admin(id).await?;
        Toast::success("Admin Added")
            .with_description(format!("{} is now an admin.", user.display_name))
    };

    let table = UsersFragment {
        users: load_users(state.pool()).await?,
        me: admin.id,
        live_error: None,
    };
    Ok(flash::with_toast(table, &toast))
}
