//! Header search dropdown.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::search::SearchHit;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Dropdown fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/search_results.html")]
pub struct SearchResultsTemplate {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

/// `GET /search?q=` - at most five matches, nothing for one-letter queries.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<SearchResultsTemplate> {
    let hits = state
        .search()
        .search(state.pool(), &query.q)
        .await
        .map_err(|e| AppError::Internal(format!("search catalog: {e}")))?;

    Ok(SearchResultsTemplate {
        query: query.q,
        hits,
    })
}
