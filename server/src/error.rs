//! Error types for the pdfyard server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("Upload failed: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Pdf(#[from] pdfyard::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::NoFileUploaded => (StatusCode::BAD_REQUEST, "No file uploaded".to_string()),
            ApiError::InvalidPdf(msg) => (StatusCode::BAD_REQUEST, format!("Invalid PDF: {}", msg)),
            ApiError::Multipart(e) => (e.status(), e.body_text()),
            ApiError::Pdf(e) => match e {
                pdfyard::Error::UnknownFormat
                | pdfyard::Error::UnsupportedVersion(_)
                | pdfyard::Error::Open(_)
                | pdfyard::Error::Encrypted
                | pdfyard::Error::Pdf(_)
                | pdfyard::Error::ImageDecode { .. } => {
                    (StatusCode::BAD_REQUEST, format!("Invalid PDF: {}", e))
                }
                other => {
                    tracing::error!("PDF processing failed: {}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal error".to_string(),
                    )
                }
            },
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
