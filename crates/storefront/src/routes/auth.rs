//! Customer sign-in, sign-up, and sign-out.
//!
//! Both forms live on `/login`. The page keeps the `?redirect=` target in
//! its form actions so a successful sign-in lands where the visitor was
//! headed.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use afrah_core::{Toast, ValidationErrors};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::flash;
use crate::forms::{LoginForm, SignupForm};
use crate::layout::Layout;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Where sign-in lands without a `?redirect=`.
const DEFAULT_REDIRECT: &str = "/account";

#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub redirect: Option<String>,
}

/// Which form the login page shows first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTab {
    Login,
    Signup,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub tab: AuthTab,
    /// `?redirect=...` suffix for the form actions, already encoded.
    pub redirect_query: String,
    pub login: LoginForm,
    pub login_errors: ValidationErrors,
    pub signup: SignupForm,
    pub signup_errors: ValidationErrors,
}

impl LoginTemplate {
    fn new(layout: Layout, redirect: &str) -> Self {
        Self {
            layout,
            tab: AuthTab::Login,
            redirect_query: format!("?redirect={}", urlencoding::encode(redirect)),
            login: LoginForm::default(),
            login_errors: ValidationErrors::new(),
            signup: SignupForm::default(),
            signup_errors: ValidationErrors::new(),
        }
    }

    #[must_use]
    pub fn is_signup(&self) -> bool {
        self.tab == AuthTab::Signup
    }
}

/// Redirect target for after sign-in. Only same-site paths are honored.
#[must_use]
pub fn safe_redirect(target: Option<&str>) -> &str {
    match target {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => DEFAULT_REDIRECT,
    }
}

/// `GET /login`
pub async fn login_page(layout: Layout, Query(query): Query<RedirectQuery>) -> Response {
    if layout.user.is_some() {
        return Redirect::to(safe_redirect(query.redirect.as_deref())).into_response();
    }
    LoginTemplate::new(layout, safe_redirect(query.redirect.as_deref())).into_response()
}

/// Sign the profile in and send the visitor on.
async fn complete_sign_in(session: &Session, user: CurrentUser, redirect: &str) -> Result<Response> {
    set_current_user(session, &user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    flash::flash(
        session,
        Toast::success("Success!").with_description("You're now logged in."),
    )
    .await?;
    Ok(Redirect::to(redirect).into_response())
}

/// Re-render the login page with a failed-auth toast, or propagate server
/// errors.
fn auth_failure(mut page: LoginTemplate, err: AuthError) -> Result<Response> {
    if err.is_server_error() {
        return Err(AppError::Auth(err));
    }
    tracing::info!(error = %err, "authentication failed");
    page.layout.toast =
        Some(Toast::error("Authentication Failed").with_description(err.user_message()));
    Ok((err.status(), page).into_response())
}

/// `POST /login`
#[instrument(skip(state, session, layout, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Query(query): Query<RedirectQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let redirect = safe_redirect(query.redirect.as_deref()).to_owned();

    if let Err(errors) = form.validate() {
        let mut page = LoginTemplate::new(layout, &redirect);
        page.login = form;
        page.login_errors = errors;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(profile) => complete_sign_in(&session, profile.into(), &redirect).await,
        Err(err) => {
            let mut page = LoginTemplate::new(layout, &redirect);
            page.login = LoginForm {
                password: String::new(),
                ..form
            };
            auth_failure(page, err)
        }
    }
}

/// `POST /signup` - creates the account and its profile, then signs in.
#[instrument(skip(state, session, layout, form), fields(email = %form.email))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Query(query): Query<RedirectQuery>,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let redirect = safe_redirect(query.redirect.as_deref()).to_owned();

    if let Err(errors) = form.validate() {
        let mut page = LoginTemplate::new(layout, &redirect);
        page.tab = AuthTab::Signup;
        page.signup = SignupForm {
            password: String::new(),
            ..form
        };
        page.signup_errors = errors;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    match AuthService::new(state.pool())
        .register(&form.display_name, &form.email, &form.password)
        .await
    {
        Ok(profile) => complete_sign_in(&session, profile.into(), &redirect).await,
        Err(err) => {
            let mut page = LoginTemplate::new(layout, &redirect);
            page.tab = AuthTab::Signup;
            page.signup = SignupForm {
                password: String::new(),
                ..form
            };
            auth_failure(page, err)
        }
    }
}

/// `POST /logout`
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    session.cycle_id().await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_redirect_accepts_local_paths() {
        assert_eq!(safe_redirect(Some("/shop")), "/shop");
        assert_eq!(safe_redirect(Some("/product/ajwa-dates?x=1")), "/product/ajwa-dates?x=1");
    }

    #[test]
    fn test_safe_redirect_rejects_offsite_targets() {
        assert_eq!(safe_redirect(None), "/account");
        assert_eq!(safe_redirect(Some("https://evil.example")), "/account");
        assert_eq!(safe_redirect(Some("//evil.example")), "/account");
        assert_eq!(safe_redirect(Some("/\\evil.example")), "/account");
        assert_eq!(safe_redirect(Some("")), "/account");
        assert_eq!(safe_redirect(Some("/ok\r\nSet-Cookie: x")), "/account");
    }
}
