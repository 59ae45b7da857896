//! Text recognition for uploaded report images
//!
//! OCR is delegated to the `tesseract` command-line tool, which reads the
//! image on stdin and writes the recognised text to stdout.

use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// OCR errors
#[derive(Debug, Error)]
pub enum OcrError {
    /// Input is not an image format tesseract can read
    #[error("Unsupported file type")]
    UnsupportedFormat,

    /// The OCR process could not be started or fed
    #[error("OCR process error: {0}")]
    Process(#[from] std::io::Error),

    /// The OCR process exited unsuccessfully
    #[error("OCR failed: {0}")]
    Failed(String),
}

/// Extracts text from an uploaded file
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String, OcrError>;
}

/// Image formats recognised by their leading bytes
const IMAGE_SIGNATURES: &[&[u8]] = &[
    b"\x89PNG\r\n\x1a\n",
    b"\xff\xd8\xff",
    b"GIF87a",
    b"GIF89a",
    b"BM",
    b"II*\x00",
    b"MM\x00*",
];

/// Whether `bytes` start like an image tesseract can read
pub fn is_image(bytes: &[u8]) -> bool {
    let webp = bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP";
    webp || IMAGE_SIGNATURES.iter().any(|sig| bytes.starts_with(sig))
}

/// [`TextExtractor`] backed by the tesseract CLI
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    command: String,
}

impl TesseractExtractor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl TextExtractor for TesseractExtractor {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String, OcrError> {
        if !is_image(&bytes) {
            return Err(OcrError::UnsupportedFormat);
        }

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&bytes).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("{} exited with {}: {}", self.command, output.status, stderr);
            return Err(OcrError::Failed(stderr));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("OCR recognised {} characters", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image() {
        assert!(is_image(b"\x89PNG\r\n\x1a\n rest"));
        assert!(is_image(b"\xff\xd8\xff\xe0 jpeg"));
        assert!(is_image(b"RIFF\x00\x00\x00\x00WEBPVP8 "));
        assert!(!is_image(b"%PDF-1.7"));
        assert!(!is_image(b"plain text"));
        assert!(!is_image(b""));
    }

    #[tokio::test]
    async fn test_non_images_are_unsupported() {
        let extractor = TesseractExtractor::new("tesseract");
        let result = extractor.extract_text(b"%PDF-1.7 ...".to_vec()).await;
        assert!(matches!(result, Err(OcrError::UnsupportedFormat)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_process_error() {
        let extractor = TesseractExtractor::new("definitely-not-an-installed-ocr-binary");
        let result = extractor.extract_text(b"\x89PNG\r\n\x1a\n".to_vec()).await;
        assert!(matches!(result, Err(OcrError::Process(_))));
    }
}
