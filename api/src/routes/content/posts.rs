//! Blog post endpoints (/api/posts)

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use std::sync::Arc;

use super::PostResponse;
use crate::AppState;
use crate::domain::posts;
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/{slug}", get(get_post))
}

/// GET /api/posts - Post summaries, newest first
async fn list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let list = posts::list_posts(state.store.as_ref())
        .await
        .log_500("Failed to fetch posts")?;

    Ok(Json(
        list.into_iter()
            .map(|p| PostResponse::new(p, &state.images))
            .collect(),
    ))
}

/// GET /api/posts/{slug} - One post including its body
async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = posts::get_post_by_slug(state.store.as_ref(), &slug)
        .await
        .log_500("Failed to fetch post")?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    Ok(Json(PostResponse::new(post, &state.images)))
}
