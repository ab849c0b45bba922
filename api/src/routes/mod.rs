pub mod content;
pub mod downloads;

use axum::{Router, routing::get};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::AppState;

/// Build all routes for the API. Downloaded media is served back from `downloads_root`.
pub fn build_routes(downloads_root: PathBuf) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .merge(downloads::routes())
        .merge(content::routes())
        .nest_service("/downloads", ServeDir::new(downloads_root))
}

async fn health() -> &'static str {
    "ok"
}
