//! Back-office sign-in and sign-out.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;
use tracing::instrument;

use afrah_core::{Toast, ValidationErrors};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::flash;
use crate::forms::LoginForm;
use crate::middleware::auth::session_admin;
use crate::middleware::{clear_current_admin, login_rate_limiter, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub toast: Option<Toast>,
    pub form: LoginForm,
    pub errors: ValidationErrors,
}

pub fn router() -> Router<AppState> {
    let attempts = Router::new()
        .route("/login", post(login))
        .route_layer(login_rate_limiter());

    Router::new()
        .route("/login", get(login_page))
        .route("/logout", post(logout))
        .merge(attempts)
}

/// `GET /login`
async fn login_page(session: Session) -> Response {
    if session_admin(&session).await.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        toast: flash::take(&session).await,
        form: LoginForm::default(),
        errors: ValidationErrors::new(),
    }
    .into_response()
}

/// `POST /login`
#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if let Err(errors) = form.validate() {
        let page = LoginTemplate {
            toast: None,
            form: LoginForm {
                password: String::new(),
                ..form
            },
            errors,
        };
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    match AuthService::new(state.pool()).login(&form.email, &form.password).await {
        Ok(profile) => {
            let admin = CurrentAdmin::from(profile);
            set_current_admin(&session, &admin).await?;
            set_sentry_user(&admin.id, admin.email.as_str());
            tracing::info!(user_id = %admin.id, "admin signed in");
            flash::flash(
                &session,
                Toast::success("Login Successful!").with_description("You're now logged in."),
            )
            .await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(err) if err.is_server_error() => Err(AppError::Auth(err)),
        Err(err) => {
            tracing::info!(error = %err, "admin sign-in failed");
            let toast = match err {
                AuthError::NotAdmin => {
                    Toast::error("Permission Denied").with_description(err.user_message())
                }
                _ => Toast::error("Login Failed").with_description(err.user_message()),
            };
            let page = LoginTemplate {
                toast: Some(toast),
                form: LoginForm {
                    password: String::new(),
                    ..form
                },
                errors: ValidationErrors::new(),
            };
            Ok((err.status(), page).into_response())
        }
    }
}

/// `POST /logout`
#[instrument(skip(session))]
async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    session.cycle_id().await?;
    clear_sentry_user();
    Ok(Redirect::to("/login"))
}
