//! OCR error types

use std::time::Duration;

/// Failures talking to the external engine
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("{command} is not installed or not executable: {source}")]
    NotFound {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("{command} did not finish within {secs}s", secs = .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    #[error("Failed to encode image for OCR: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error talking to OCR engine: {0}")]
    Io(#[from] std::io::Error),
}
