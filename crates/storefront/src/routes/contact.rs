//! Contact page and form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use afrah_core::{Toast, ValidationErrors};
use afrah_store::ContactRepository;
use afrah_store::rules::{DocPath, Operation};

use crate::error::Result;
use crate::flash;
use crate::forms::ContactForm;
use crate::layout::Layout;
use crate::models::actor_of;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub layout: Layout,
    pub form: ContactForm,
    pub errors: ValidationErrors,
}

/// `GET /contact`
pub async fn show(layout: Layout) -> ContactTemplate {
    let form = ContactForm {
        name: layout.user.as_ref().map(|u| u.display_name.clone()).unwrap_or_default(),
        email: layout.user.as_ref().map(|u| u.email.to_string()).unwrap_or_default(),
        ..ContactForm::default()
    };
    ContactTemplate {
        layout,
        form,
        errors: ValidationErrors::new(),
    }
}

/// `POST /contact`
#[instrument(skip(state, session, layout, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    let message = match form.validate() {
        Ok(message) => message,
        Err(errors) => {
            let page = ContactTemplate {
                layout,
                form,
                errors,
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    state.errors().check(
        &actor_of(layout.user.as_ref()),
        &DocPath::Contacts,
        Operation::Create,
        Some(json!({ "email": message.email, "subject": message.subject })),
    )?;

    let saved = ContactRepository::new(state.pool()).create(&message).await?;
    tracing::info!(message_id = %saved.id, "contact message received");

    flash::flash(
        &session,
        Toast::success("Message Sent!")
            .with_description("Thank you for reaching out. We'll get back to you soon."),
    )
    .await?;
    Ok(Redirect::to("/contact").into_response())
}
