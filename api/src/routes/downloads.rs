//! Media download endpoint (/api/download-twitter-media)

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use crate::AppState;
use crate::constants::DOWNLOADER_INSTALL_URL;
use crate::services::error::ApiError;
use crate::services::media_downloader::{DownloadError, DownloadOptions, DownloadResult};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/download-twitter-media", post(download_twitter_media))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DownloadRequest {
    username: Option<String>,
    options: DownloadOptions,
}

/// POST /api/download-twitter-media - Run the downloader once and list the images on disk
async fn download_twitter_media(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadResult>, ApiError> {
    let Json(req) = payload?;
    let username = req.username.unwrap_or_default();

    let result = state
        .downloader
        .download(&username, &req.options)
        .await
        .map_err(download_error_response)?;

    Ok(Json(result))
}

fn download_error_response(e: DownloadError) -> ApiError {
    let details = e.to_string();
    match e {
        DownloadError::Validation(message) => ApiError::bad_request(message),
        DownloadError::ToolNotInstalled { .. } => {
            error!("[downloads] {}", details);
            ApiError::internal(
                "twitter-media-downloader (twmd) is not installed. Please install it first.",
            )
            .with_details(details)
            .with_install_instructions(format!(
                "Visit {} for installation instructions",
                DOWNLOADER_INSTALL_URL
            ))
        }
        DownloadError::TimedOut(_) => {
            error!("[downloads] {}", details);
            ApiError::internal("Download timed out").with_details(details)
        }
        DownloadError::ToolFailed { .. } | DownloadError::Io(_) => {
            error!("[downloads] {}", details);
            ApiError::internal("Download failed").with_details(details)
        }
    }
}
