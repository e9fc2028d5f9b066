#[cfg(test)]
mod tests;

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::config::OcrConfig;
use crate::{Result, ScandexError};

/// Extracts text from a scanned document image.
///
/// An empty result means "no text found" and is a skip signal for the
/// pipeline, not a failure. Errors are reserved for the engine itself
/// failing on an image.
pub trait OcrEngine {
    fn extract_text(&self, image: &Path) -> Result<String>;
}

/// OCR engine driving the `tesseract` binary as a subprocess.
pub struct TesseractOcr {
    binary: String,
    language: String,
    psm: u8,
    oem: u8,
}

impl TesseractOcr {
    #[inline]
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            language: config.language.clone(),
            psm: config.psm,
            oem: config.oem,
        }
    }
}

impl OcrEngine for TesseractOcr {
    #[inline]
    fn extract_text(&self, image: &Path) -> Result<String> {
        debug!("Running OCR on {}", image.display());

        let output = Command::new(&self.binary)
            .arg(image)
            .arg("stdout")
            .args(["--oem", &self.oem.to_string()])
            .args(["--psm", &self.psm.to_string()])
            .args(["-l", &self.language])
            .output()
            .map_err(|e| ScandexError::Ocr(format!("failed to launch {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScandexError::Ocr(format!(
                "{} exited with {} for {}: {}",
                self.binary,
                output.status,
                image.display(),
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            warn!("No text found in {}", image.display());
        }
        Ok(text)
    }
}

/// Whether a path looks like an image the indexer should OCR.
#[inline]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            matches!(
                ext.to_ascii_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "webp"
            )
        })
}
