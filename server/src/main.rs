//! pdfyard HTTP server
//!
//! Accepts PDF uploads, extracts their embedded images as PNG files, and
//! serves the results from the upload directory.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;

use api::AppState;
use config::{ServerConfig, DEFAULT_LOG_FILTER};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present, before flags read their env fallbacks
    dotenvy::dotenv().ok();

    let config = ServerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let state = Arc::new(AppState {
        upload_dir: config.upload_dir.clone(),
        url_prefix: config.normalized_prefix(),
    });
    let app = api::router(state, config.max_upload_bytes());

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Upload directory: {}", config.upload_dir.display());
    info!("Max upload size: {} MB", config.max_upload_mb);

    axum::serve(listener, app).await?;

    Ok(())
}
