//! OCR Upload Server
//!
//! A small HTTP service that takes an uploaded image, hands it to an external
//! OCR engine and returns the recognized text as JSON.
//!
//! # Modules
//!
//! - `config`: Environment-driven settings, built once at startup
//! - `imaging`: Decode uploads and bound their size
//! - `ocr`: Engine traits and the Tesseract CLI implementation
//! - `emails`: Pull email addresses out of recognized text
//! - `draft`: Draft an outreach email from recognized text via a chat API
//! - `routes`: `/upload`, `/check`, `/emails`, `/generate-email` and `/health`

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod draft;
pub mod emails;
pub mod error;
pub mod imaging;
pub mod ocr;
pub mod routes;
pub mod state;

use state::AppState;

/// Build the full router with tracing and CORS layers applied
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().server.cors_origin);
    let max_upload_bytes = state.config().server.max_upload_bytes;

    Router::new()
        .merge(routes::health::router())
        .merge(routes::check::router())
        .merge(routes::upload::router(max_upload_bytes))
        .merge(routes::emails::router())
        .merge(routes::draft::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Allow exactly one browser origin. `*` opens it up for local development.
///
/// A list match is used so that other origins get no allow-origin header at all.
fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origin == "*" {
        return cors.allow_origin(Any);
    }

    match HeaderValue::from_str(origin) {
        Ok(origin) => cors.allow_origin(AllowOrigin::list([origin])),
        Err(e) => {
            tracing::warn!("Ignoring unusable CORS origin {:?}: {}", origin, e);
            cors
        }
    }
}
