//! QR code generation with cache-by-existence.
//!
//! The QR image is a pure function of (base URL, part identity), so a file
//! already sitting at the canonical path makes regeneration pointless —
//! [`QrGenerator::ensure`] does nothing but an existence check in that case.

use crate::{PublishConfig, Result};
use image::Luma;
use qrcode::QrCode;
use std::path::{Path, PathBuf};

/// Minimum pixel edge for the rendered PNG. The stamped QR prints at 1.25"
/// on a drawing; this keeps modules comfortably above scanner resolution.
const MIN_PIXELS: u32 = 330;

/// Generates and caches the per-part QR image.
pub struct QrGenerator<'a> {
    config: &'a PublishConfig,
}

impl<'a> QrGenerator<'a> {
    pub fn new(config: &'a PublishConfig) -> Self {
        Self { config }
    }

    /// Canonical image path for a part inside its output directory.
    pub fn image_path(output_dir: &Path, part: &str) -> PathBuf {
        output_dir.join(format!("QR_{part}.png"))
    }

    /// Make sure the part's QR PNG exists and return its path.
    ///
    /// If the canonical path already holds a file it is returned unchanged —
    /// no decode, no content check. Otherwise the part's page URL is encoded
    /// into a fresh QR symbol and written there; a failed write is surfaced,
    /// never swallowed.
    pub fn ensure(&self, output_dir: &Path, part: &str) -> Result<PathBuf> {
        let path = Self::image_path(output_dir, part);
        if path.is_file() {
            return Ok(path);
        }

        let url = self.config.page_url(part);
        let code = QrCode::new(url.as_bytes())?;
        let rendered = code
            .render::<Luma<u8>>()
            .min_dimensions(MIN_PIXELS, MIN_PIXELS)
            .build();
        rendered.save(&path)?;

        println!(
            "Made QR: {} -> {url}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        Ok(path)
    }
}
