//! OCR Upload Server
//!
//! Accepts image uploads over HTTP and returns the text Tesseract finds in them.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_upload_server::config::Config;
use ocr_upload_server::ocr::EngineVersion;
use ocr_upload_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ocr_upload_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("invalid configuration")?;

    tracing::info!("Starting OCR Upload Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("OCR engine: {} (language {})", config.ocr.command, config.ocr.language);
    tracing::info!("CORS origin: {}", config.server.cors_origin);
    match config.ocr.max_dimension {
        Some(max) => tracing::info!("Downscaling uploads to fit {}x{}", max, max),
        None => tracing::info!("Downscaling disabled"),
    }
    if config.draft.api_key.is_some() {
        tracing::info!("Email drafting via {} ({})", config.draft.api_base, config.draft.model);
    }

    let host = config.server.host.clone();
    let port = config.server.port;

    let state = AppState::new(config);

    // A missing engine is reported, not fatal: /check keeps saying so.
    match state.versions().version().await {
        Ok(banner) => tracing::info!(
            "Found {}",
            banner.lines().next().unwrap_or_default().trim()
        ),
        Err(e) => tracing::warn!("OCR engine not usable yet: {}", e),
    }

    let app = ocr_upload_server::app(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {}:{}", host, port))?;
    let addr: SocketAddr = listener.local_addr()?;

    tracing::info!("OCR Upload Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
