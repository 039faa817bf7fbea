//! Upload Routes
//!
//! `POST /upload` takes a multipart form carrying an image and answers with the
//! text the OCR engine found in it.
//!
//! The file is read from the `image` field, or from `file` when no non-empty
//! `image` part was sent.

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::imaging;
use crate::state::AppState;

/// Preferred form field
pub const IMAGE_FIELD: &str = "image";

/// Fallback form field
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub text: String,
}

/// A file part pulled out of the form
#[derive(Debug)]
struct UploadedFile {
    field: &'static str,
    file_name: Option<String>,
    data: Bytes,
}

/// Create the upload router
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// POST /upload
async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let multipart = multipart.map_err(|e| {
        tracing::debug!("Not a multipart upload: {}", e);
        AppError::MissingFile
    })?;

    let file = read_file(multipart).await?;

    tracing::debug!(
        field = file.field,
        file_name = ?file.file_name,
        bytes = file.data.len(),
        "Received upload"
    );

    let max_dimension = state.config().ocr.max_dimension;
    let image = tokio::task::spawn_blocking(move || imaging::prepare(&file.data, max_dimension))
        .await
        .map_err(|e| AppError::Internal(format!("image decoding task failed: {}", e)))??;

    let (width, height) = (image.width(), image.height());
    let text = state.engine().recognize(image).await?;

    tracing::info!(width, height, chars = text.chars().count(), "OCR complete");

    Ok(Json(UploadResponse { text }))
}

/// Walk the form and pick the upload. The first non-empty `image` part wins;
/// otherwise the first non-empty `file` part. A stream that breaks off part
/// way counts as having no more fields.
async fn read_file(mut multipart: Multipart) -> Result<UploadedFile> {
    let mut fallback: Option<UploadedFile> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                check_size(&e)?;
                tracing::debug!("Stopped reading multipart body: {}", e);
                break;
            }
        };

        let field_name = match field.name() {
            Some(IMAGE_FIELD) => IMAGE_FIELD,
            Some(FILE_FIELD) => FILE_FIELD,
            _ => continue,
        };
        let file_name = field.file_name().map(|s| s.to_string());

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                check_size(&e)?;
                tracing::debug!(field = field_name, "Failed to read file data: {}", e);
                break;
            }
        };

        if data.is_empty() {
            continue;
        }

        let file = UploadedFile {
            field: field_name,
            file_name,
            data,
        };
        if field_name == IMAGE_FIELD {
            return Ok(file);
        }
        if fallback.is_none() {
            fallback = Some(file);
        }
    }

    fallback.ok_or(AppError::MissingFile)
}

fn check_size(e: &MultipartError) -> Result<()> {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Err(AppError::PayloadTooLarge(e.body_text()));
    }
    Ok(())
}
