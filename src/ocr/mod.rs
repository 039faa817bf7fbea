//! OCR Module
//!
//! Text recognition is delegated to an external engine. The service only
//! talks to it through two small traits:
//! - [`OcrEngine`] turns a decoded image into text
//! - [`EngineVersion`] reports which engine build is installed
//!
//! [`TesseractCli`] implements both by shelling out to the `tesseract` binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_upload_server::ocr::{OcrEngine, TesseractCli};
//!
//! let engine = TesseractCli::new("tesseract", "eng", Duration::from_secs(30));
//! let text = engine.recognize(image).await?;
//! ```

mod provider;
mod types;

pub use provider::{EngineVersion, OcrEngine, TesseractCli};
pub use types::OcrError;

#[cfg(test)]
pub use provider::mock;
