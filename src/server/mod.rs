//! Read-only HTTP API
//!
//! Serves the store over plain HTTP:
//! - `GET /search?q=` - full-text search
//! - `GET /recent?n=` - newest pages
//! - `GET /random?n=` - random pages
//! - `GET /opensearch.xml` - OpenSearch description
//!
//! Result bodies are plain text in the same layout as the command line.
//! Store failures answer 500 with `internal error: <cause>`.

mod handlers;

use crate::config::ServerConfig;
use crate::storage::SqliteStorage;
use axum::routing::get;
use axum::Router;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Shared state of the API
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Mutex<SqliteStorage>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(storage: SqliteStorage, config: ServerConfig) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            config: Arc::new(config),
        }
    }
}

/// Builds the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", get(handlers::search_handler))
        .route("/recent", get(handlers::recent_handler))
        .route("/random", get(handlers::random_handler))
        .route("/opensearch.xml", get(handlers::opensearch_handler))
        .with_state(state)
}

/// Binds `config.listen` and serves until the process exits
pub async fn serve(storage: SqliteStorage, config: ServerConfig) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    let app = router(AppState::new(storage, config));
    axum::serve(listener, app).await?;
    Ok(())
}
