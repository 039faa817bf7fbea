//! Email extraction endpoint
//!
//! `POST /emails` with `{"text": "..."}` returns the addresses found in the
//! text, typically the `text` an `/upload` call just returned.

use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::emails::extract_emails;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailsRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmailsResponse {
    pub emails: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/emails", post(emails))
}

/// POST /emails
async fn emails(
    payload: std::result::Result<Json<EmailsRequest>, JsonRejection>,
) -> Result<Json<EmailsResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    Ok(Json(EmailsResponse {
        emails: extract_emails(&request.text),
    }))
}
