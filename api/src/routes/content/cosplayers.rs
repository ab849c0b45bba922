//! Cosplayer endpoints (/api/cosplayers, /api/save-cosplayer)

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::CosplayerResponse;
use crate::AppState;
use crate::domain::cosplayers::{self, PersistError, ProfileDraft};
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/cosplayers", get(list_cosplayers))
        .route("/api/cosplayers/{slug}", get(get_cosplayer))
        .route("/api/save-cosplayer", post(save_cosplayer))
}

#[derive(Debug, Serialize)]
pub struct SaveCosplayerResponse {
    pub success: bool,
    /// The document as stored, including store-assigned `_id` and `_rev`
    pub cosplayer: Value,
    pub message: &'static str,
}

/// GET /api/cosplayers - Active cosplayers, newest first
async fn list_cosplayers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CosplayerResponse>>, ApiError> {
    let list = cosplayers::list_cosplayers(state.store.as_ref())
        .await
        .log_500("Failed to fetch cosplayers")?;

    Ok(Json(
        list.into_iter()
            .map(|c| CosplayerResponse::new(c, &state.images))
            .collect(),
    ))
}

/// GET /api/cosplayers/{slug}
async fn get_cosplayer(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<CosplayerResponse>, ApiError> {
    let cosplayer = cosplayers::get_cosplayer_by_slug(state.store.as_ref(), &slug)
        .await
        .log_500("Failed to fetch cosplayer")?
        .ok_or_else(|| ApiError::not_found("Cosplayer not found"))?;

    Ok(Json(CosplayerResponse::new(cosplayer, &state.images)))
}

/// POST /api/save-cosplayer - Create one profile document from a client draft
async fn save_cosplayer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProfileDraft>, JsonRejection>,
) -> Result<Json<SaveCosplayerResponse>, ApiError> {
    let Json(draft) = payload?;

    let created = cosplayers::create_cosplayer(state.store.as_ref(), draft, Utc::now())
        .await
        .map_err(persist_error_response)?;

    let id = created.get("_id").and_then(Value::as_str).unwrap_or("<no id>");
    info!("[cosplayers] Created {}", id);

    Ok(Json(SaveCosplayerResponse {
        success: true,
        cosplayer: created,
        message: "Cosplayer profile created successfully",
    }))
}

fn persist_error_response(e: PersistError) -> ApiError {
    match e {
        PersistError::Validation(message) => ApiError::bad_request(message),
        PersistError::Duplicate(inner) => {
            warn!("[cosplayers] Duplicate profile: {}", inner);
            ApiError::new(StatusCode::CONFLICT, "A cosplayer with this name already exists")
                .with_details(inner.to_string())
        }
        PersistError::Store(inner) => {
            error!("[cosplayers] Save failed: {}", inner);
            ApiError::internal("Failed to save cosplayer").with_details(inner.to_string())
        }
        PersistError::Encode(inner) => {
            error!("[cosplayers] Save failed: {}", inner);
            ApiError::internal("Failed to save cosplayer").with_details(inner.to_string())
        }
    }
}
