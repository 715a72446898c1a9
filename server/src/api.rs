//! API handlers for the pdfyard server
//!
//! Provides endpoints for:
//! - Image extraction from uploaded PDFs
//! - Serving extracted images
//! - Health checks

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use pdfyard::detect::is_pdf_bytes;
use pdfyard::extract::{upload_base_name, write_images, ImageExtractor};
use pdfyard::output::write_atomic;

use crate::error::ApiError;

/// Multipart field carrying the uploaded PDF.
const UPLOAD_FIELD: &str = "pdf";

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Where uploads and extracted images are stored
    pub upload_dir: PathBuf,
    /// URL prefix the upload directory is served under, e.g. "/uploads"
    pub url_prefix: String,
}

/// Build the application router.
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let files = ServeDir::new(&state.upload_dir);

    Router::new()
        .route("/", get(handle_home))
        .route("/health", get(handle_health))
        .route("/extract-images", post(handle_extract_images))
        .nest_service(&state.url_prefix, files)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Handler: GET /
pub async fn handle_home() -> &'static str {
    "This is the API server"
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "pdfyard-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Extraction response
#[derive(Debug, Serialize)]
pub struct ExtractImagesResponse {
    /// URLs of the extracted PNG files
    pub images: Vec<String>,
}

/// Handler: POST /extract-images
///
/// Expects a multipart form with the PDF in the `pdf` field.
pub async fn handle_extract_images(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ExtractImagesResponse>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            let filename = field.file_name().unwrap_or("upload.pdf").to_string();
            let data = field.bytes().await?;
            upload = Some((filename, data));
            break;
        }
    }

    let (filename, data) = upload.ok_or(ApiError::NoFileUploaded)?;
    if !is_pdf_bytes(&data) {
        return Err(ApiError::InvalidPdf("not a PDF file".to_string()));
    }
    info!("Extract request: file={}, size={}", filename, data.len());

    let worker_state = Arc::clone(&state);
    let names = tokio::task::spawn_blocking(move || {
        extract_and_store(&worker_state, &filename, &data)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let images: Vec<String> = names
        .iter()
        .map(|name| format!("{}/{}", state.url_prefix, name))
        .collect();
    debug!("Extracted: {:?}", images);

    Ok(Json(ExtractImagesResponse { images }))
}

/// Store the upload and its images; returns the image file names.
fn extract_and_store(state: &AppState, filename: &str, data: &[u8]) -> Result<Vec<String>, ApiError> {
    let base_name = upload_base_name(filename, data);
    write_atomic(state.upload_dir.join(format!("{}.pdf", base_name)), data)?;

    let images = ImageExtractor::default().extract_bytes(data)?;
    let names = write_images(&images, &state.upload_dir, &base_name)?;
    info!("Stored {} images for {}", names.len(), base_name);
    Ok(names)
}
