//! Error types for the OCR upload server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::draft::ChatError;
use crate::ocr::OcrError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Every way a request can fail. Each maps to one status code and the same
/// `{"error": "..."}` body.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file uploaded")]
    MissingFile,

    /// Client sent something unusable; message goes back as-is
    #[error("{0}")]
    BadRequest(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    /// Decoder message passed through as-is
    #[error("{0}")]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    /// The engine could not be reached at all (version check)
    #[error(transparent)]
    EngineUnavailable(OcrError),

    #[error("Email drafting is not configured")]
    DraftingDisabled,

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFile | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::EngineUnavailable(_) | AppError::DraftingDisabled => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Decode(_) | AppError::Ocr(_) | AppError::Chat(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = %status, "{}", self);
        } else {
            tracing::debug!(status = %status, "{}", self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
