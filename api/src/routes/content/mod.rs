//! Content endpoints - cosplayer profiles and blog posts backed by the content store

pub mod cosplayers;
pub mod posts;
mod dto;

pub use dto::{CosplayerResponse, PostResponse};

use axum::Router;
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(cosplayers::routes())
        .merge(posts::routes())
}
