//! Static pages: about, FAQ, and the policies.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::content::{FAQS, Faq};
use crate::layout::Layout;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub layout: Layout,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/faq.html")]
pub struct FaqTemplate {
    pub layout: Layout,
    pub faqs: &'static [Faq],
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/privacy_policy.html")]
pub struct PrivacyPolicyTemplate {
    pub layout: Layout,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/refund_policy.html")]
pub struct RefundPolicyTemplate {
    pub layout: Layout,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/terms_conditions.html")]
pub struct TermsTemplate {
    pub layout: Layout,
    pub base_url: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}

pub async fn about(layout: Layout) -> AboutTemplate {
    AboutTemplate { layout }
}

pub async fn faq(layout: Layout) -> FaqTemplate {
    FaqTemplate { layout, faqs: FAQS }
}

pub async fn privacy_policy(layout: Layout) -> PrivacyPolicyTemplate {
    PrivacyPolicyTemplate { layout }
}

pub async fn refund_policy(layout: Layout) -> RefundPolicyTemplate {
    RefundPolicyTemplate { layout }
}

pub async fn terms_conditions(State(state): State<AppState>, layout: Layout) -> TermsTemplate {
    TermsTemplate {
        layout,
        base_url: state.config().base_url.clone(),
    }
}

/// Router fallback.
pub async fn not_found(layout: Layout) -> Response {
    (StatusCode::NOT_FOUND, NotFoundTemplate { layout }).into_response()
}
