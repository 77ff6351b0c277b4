//! Request handlers for the read-only API

use crate::output::format_pages;
use crate::server::AppState;
use crate::storage::{Page, SqliteStorage, Storage, StorageResult};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::error;

const OPENSEARCH_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OpenSearchDescription xmlns="http://a9.com/-/spec/opensearch/1.1/">
  <ShortName>baks</ShortName>
  <Description>baks bookmarks search engine</Description>
  <InputEncoding>UTF-8</InputEncoding>
  <Url type="text/plain" template="http://{announce}/search?q={searchTerms}" />
</OpenSearchDescription>
"#;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub n: Option<String>,
}

/// GET /search?q= - full-text search, newest first
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.q;
    let result = state.with_storage(|storage| {
        let count = storage.search_count(&query)?;
        let pages = storage.search(&query)?;
        Ok((count, pages))
    });

    match result {
        Ok((count, pages)) => results(&query, count, &pages),
        Err(message) => internal_error(message),
    }
}

/// GET /recent?n= - most recently added pages
pub async fn recent_handler(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Response {
    let limit = state.limit(params.n.as_deref());
    match state.with_storage(|storage| storage.recent(limit)) {
        Ok(pages) => results("Recent", pages.len() as u64, &pages),
        Err(message) => internal_error(message),
    }
}

/// GET /random?n= - random sample of pages
pub async fn random_handler(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Response {
    let limit = state.limit(params.n.as_deref());
    match state.with_storage(|storage| storage.random(limit)) {
        Ok(pages) => results("Random", pages.len() as u64, &pages),
        Err(message) => internal_error(message),
    }
}

/// GET /opensearch.xml - browser search engine registration
pub async fn opensearch_handler(State(state): State<AppState>) -> Response {
    let body = OPENSEARCH_TEMPLATE.replace("{announce}", state.config.announce_addr());
    (
        [(header::CONTENT_TYPE, "application/opensearchdescription+xml")],
        body,
    )
        .into_response()
}

fn results(title: &str, count: u64, pages: &[Page]) -> Response {
    let body = format!("{}: {} results\n\n{}", title, count, format_pages(pages));
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

fn internal_error(message: String) -> Response {
    error!("API request failed: {}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("internal error: {}", message),
    )
        .into_response()
}

impl AppState {
    /// Runs `f` against the locked store, flattening lock and store errors
    fn with_storage<T>(
        &self,
        f: impl FnOnce(&SqliteStorage) -> StorageResult<T>,
    ) -> Result<T, String> {
        let storage = self
            .storage
            .lock()
            .map_err(|_| "storage lock poisoned".to_string())?;
        f(&storage).map_err(|e| e.to_string())
    }

    /// Parses `n`, falling back to the configured default
    fn limit(&self, n: Option<&str>) -> usize {
        n.and_then(|n| n.trim().parse().ok())
            .unwrap_or(self.config.default_limit)
    }
}
