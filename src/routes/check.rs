//! Engine check endpoint
//!
//! `GET /check` runs the engine's version command and reports the banner.
//! When the engine is missing or broken the answer is a 503 with an
//! `{"error": "..."}` body.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
    /// Raw output of `tesseract --version`
    pub tesseract_version: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/check", get(check))
}

/// GET /check
async fn check(State(state): State<AppState>) -> Result<Json<VersionResponse>> {
    let version = state
        .versions()
        .version()
        .await
        .map_err(AppError::EngineUnavailable)?;

    Ok(Json(VersionResponse {
        tesseract_version: version,
    }))
}
