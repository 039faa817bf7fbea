//! Email draft endpoint
//!
//! `POST /generate-email` with `{"email": "...", "text": "..."}` asks the
//! configured chat API for a subject and body addressed to `email`, based on
//! `text`. Returns 503 when no chat API key is configured.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::draft::draft_email;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DraftResponse {
    pub success: bool,
    pub email: String,
    pub subject: String,
    pub body: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/generate-email", post(generate_email))
}

/// POST /generate-email
async fn generate_email(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DraftRequest>, JsonRejection>,
) -> Result<Json<DraftResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let email = request
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("No email provided".to_string()))?;

    let chat = state.chat().ok_or(AppError::DraftingDisabled)?;
    let draft = draft_email(chat, state.sender(), &email, &request.text).await?;

    tracing::info!(
        recipient = %email,
        subject = %draft.subject,
        body_chars = draft.body.chars().count(),
        "Drafted email"
    );

    Ok(Json(DraftResponse {
        success: true,
        email,
        subject: draft.subject,
        body: draft.body,
    }))
}
