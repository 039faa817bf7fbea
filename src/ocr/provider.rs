//! OCR Providers
//!
//! Defines the engine traits and the Tesseract command-line implementation.

use std::io::Cursor;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::types::OcrError;

/// Turns a decoded image into text
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Run recognition once. The returned text is whatever the engine printed,
    /// possibly empty.
    async fn recognize(&self, image: DynamicImage) -> Result<String, OcrError>;
}

/// Reports the installed engine's version banner
#[async_trait]
pub trait EngineVersion: Send + Sync {
    async fn version(&self) -> Result<String, OcrError>;
}

/// Tesseract driven through its CLI, image piped over stdin
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: String,
    language: String,
    timeout: Duration,
}

impl TesseractCli {
    pub fn new(command: impl Into<String>, language: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
            timeout,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn timed_out(&self) -> OcrError {
        OcrError::Timeout {
            command: self.command.clone(),
            timeout: self.timeout,
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, image: DynamicImage) -> Result<String, OcrError> {
        let png = tokio::task::spawn_blocking(move || encode_png(image))
            .await
            .map_err(|e| OcrError::Io(std::io::Error::other(e)))??;

        let mut child = Command::new(&self.command)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OcrError::NotFound {
                command: self.command.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            OcrError::Io(std::io::Error::other("engine stdin was not captured"))
        })?;

        tracing::debug!(
            command = %self.command,
            language = %self.language,
            bytes = png.len(),
            "Running OCR"
        );

        // Feed stdin while draining stdout/stderr so neither pipe can fill up.
        // Dropping this future on timeout drops the child, which kills it.
        let writer = async move {
            let written = stdin.write_all(&png).await;
            drop(stdin);
            written
        };
        let run = async move { tokio::join!(writer, child.wait_with_output()) };

        let (written, output) = timeout(self.timeout, run)
            .await
            .map_err(|_| self.timed_out())?;
        let output = output?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl EngineVersion for TesseractCli {
    async fn version(&self) -> Result<String, OcrError> {
        let output = timeout(
            self.timeout,
            Command::new(&self.command)
                .arg("--version")
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| self.timed_out())?
        .map_err(|source| OcrError::NotFound {
            command: self.command.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // Tesseract 3.x printed the banner on stderr
        let banner = if output.stdout.iter().all(u8::is_ascii_whitespace) {
            output.stderr
        } else {
            output.stdout
        };

        Ok(String::from_utf8_lossy(&banner).into_owned())
    }
}

/// PNG has no float pixel formats, so those are narrowed to 8-bit first
fn encode_png(image: DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let image = match image {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba8(image.to_rgba8())
        }
        other => other,
    };

    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

/// Test doubles for the engine traits
#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Engine that answers from a script and records the image sizes it was given
    pub struct MockEngine {
        reply: Result<String, String>,
        seen: Mutex<Vec<(u32, u32)>>,
    }

    impl MockEngine {
        pub fn text(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(stderr: &str) -> Self {
            Self {
                reply: Err(stderr.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn seen(&self) -> Vec<(u32, u32)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OcrEngine for MockEngine {
        async fn recognize(&self, image: DynamicImage) -> Result<String, OcrError> {
            self.seen.lock().unwrap().push((image.width(), image.height()));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(stderr) => Err(OcrError::Failed {
                    command: "mock".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: stderr.clone(),
                }),
            }
        }
    }

    /// Fixed version answer; `None` behaves like a missing binary
    pub struct MockVersion {
        pub banner: Option<String>,
    }

    #[async_trait]
    impl EngineVersion for MockVersion {
        async fn version(&self) -> Result<String, OcrError> {
            self.banner.clone().ok_or_else(|| OcrError::NotFound {
                command: "mock".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn white_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
    }

    #[test]
    fn test_encode_png_round_trips_dimensions() {
        let png = encode_png(white_image(12, 7)).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 7));
    }

    #[test]
    fn test_encode_png_narrows_float_images() {
        let float = DynamicImage::ImageRgba32F(white_image(3, 3).to_rgba32f());
        let png = encode_png(float).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[tokio::test]
    async fn test_missing_binary_reports_not_found() {
        let engine = TesseractCli::new(
            "definitely-not-an-ocr-engine-binary",
            "eng",
            Duration::from_secs(5),
        );

        let version = engine.version().await;
        assert!(matches!(version, Err(OcrError::NotFound { .. })));

        let text = engine.recognize(white_image(10, 10)).await;
        assert!(matches!(text, Err(OcrError::NotFound { .. })));
    }

    /// Write an executable shell script standing in for the engine binary
    #[cfg(unix)]
    fn script_engine(dir: &tempfile::TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-tesseract");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_engine_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let engine = TesseractCli::new(
            script_engine(&dir, "exec sleep 30"),
            "eng",
            Duration::from_secs(1),
        );

        let started = std::time::Instant::now();
        let result = engine.recognize(white_image(10, 10)).await;
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(OcrError::Timeout { .. })), "{:?}", result);
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(10), "took {:?}", elapsed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_version_command_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let engine = TesseractCli::new(
            script_engine(&dir, "exec sleep 30"),
            "eng",
            Duration::from_secs(1),
        );

        let result = engine.version().await;
        assert!(matches!(result, Err(OcrError::Timeout { .. })), "{:?}", result);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failed_with_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let engine = TesseractCli::new(
            script_engine(&dir, "cat > /dev/null\necho 'Error opening data file' >&2\nexit 3"),
            "eng",
            Duration::from_secs(10),
        );

        match engine.recognize(white_image(10, 10)).await {
            Err(OcrError::Failed { status, stderr, .. }) => {
                assert!(status.contains('3'), "{}", status);
                assert_eq!(stderr, "Error opening data file");
            }
            other => panic!("expected Failed, got {:?}", other),
        }

        assert!(matches!(engine.version().await, Err(OcrError::Failed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_is_returned_untrimmed() {
        let dir = tempfile::tempdir().unwrap();
        let engine = TesseractCli::new(
            script_engine(&dir, "cat > /dev/null\nprintf 'TEST\\n'"),
            "eng",
            Duration::from_secs(10),
        );

        let text = engine.recognize(white_image(10, 10)).await.unwrap();
        assert_eq!(text, "TEST\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_version_banner_on_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let engine = TesseractCli::new(
            script_engine(&dir, "echo 'tesseract 3.05.02' >&2"),
            "eng",
            Duration::from_secs(10),
        );

        assert_eq!(engine.version().await.unwrap(), "tesseract 3.05.02\n");
    }

    #[tokio::test]
    #[ignore = "needs tesseract installed"]
    async fn test_blank_image_yields_no_text() {
        let engine = TesseractCli::new("tesseract", "eng", Duration::from_secs(30));
        let text = engine.recognize(white_image(10, 10)).await.unwrap();
        assert!(text.trim().is_empty());
    }

    #[tokio::test]
    #[ignore = "needs tesseract installed"]
    async fn test_real_version_banner() {
        let engine = TesseractCli::new("tesseract", "eng", Duration::from_secs(10));
        let banner = engine.version().await.unwrap();
        assert!(banner.to_lowercase().contains("tesseract"));
    }
}
