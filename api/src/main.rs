mod config;
mod constants;
mod domain;
mod routes;
mod services;

use anyhow::Context;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use services::image_url::ImageUrlBuilder;
use services::media_downloader::MediaDownloader;
use services::sanity::{ContentStore, SanityClient};

pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub downloader: MediaDownloader,
    pub images: ImageUrlBuilder,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hothub_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("Invalid configuration")?;

    let images = ImageUrlBuilder::new(&config.sanity.project_id, &config.sanity.dataset);
    let store: Arc<dyn ContentStore> = Arc::new(SanityClient::new(config.sanity.clone()));
    let downloader = MediaDownloader::new(config.downloader.clone());

    let downloads_root = downloader.downloads_root();
    tokio::fs::create_dir_all(&downloads_root)
        .await
        .with_context(|| format!("Failed to create {}", downloads_root.display()))?;

    info!(
        "[config] Sanity project {} dataset {}, downloader `{}` (timeout {:?})",
        config.sanity.project_id,
        config.sanity.dataset,
        config.downloader.program,
        config.downloader.timeout
    );

    let state = Arc::new(AppState {
        store,
        downloader,
        images,
    });

    let app = routes::build_routes(downloads_root)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
