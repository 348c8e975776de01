//! Snapshot export of rasterized buffers.
//!
//! Encodes what the classifier sees as PNG or JPEG, for debugging drawings
//! that were not recognized.

use std::path::Path;

use image::ImageEncoder;

use crate::error::{RenderError, RenderResult};
use crate::pixel::PixelBuffer;

/// Snapshot output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// PNG image (lossless, keeps alpha).
    Png,
    /// JPEG image (alpha composited onto white).
    Jpeg,
}

impl SnapshotFormat {
    /// Detect format from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Encodes pixel buffers to image files.
#[derive(Debug, Clone)]
pub struct SnapshotExporter {
    /// JPEG quality 1-100.
    jpeg_quality: u8,
}

impl SnapshotExporter {
    /// Create an exporter with the given JPEG quality.
    #[must_use]
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// Encode `buffer` in `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn export(&self, buffer: &PixelBuffer, format: SnapshotFormat) -> RenderResult<Vec<u8>> {
        match format {
            SnapshotFormat::Png => Self::encode_png(buffer),
            SnapshotFormat::Jpeg => self.encode_jpeg(buffer),
        }
    }

    /// Encode `buffer` and write it to `path`, choosing the format from the
    /// file extension.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown extensions, encoding or I/O failures.
    pub fn write_to(&self, buffer: &PixelBuffer, path: &Path) -> RenderResult<()> {
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(SnapshotFormat::from_extension)
            .ok_or_else(|| {
                RenderError::Export(format!("unsupported snapshot path {}", path.display()))
            })?;
        let bytes = self.export(buffer, format)?;
        std::fs::write(path, bytes)
            .map_err(|e| RenderError::Export(format!("writing {}: {e}", path.display())))?;
        tracing::info!("Snapshot written to {}", path.display());
        Ok(())
    }

    fn encode_png(buffer: &PixelBuffer) -> RenderResult<Vec<u8>> {
        let rgba = buffer.to_rgba();
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(
                &rgba,
                buffer.width(),
                buffer.height(),
                image::ColorType::Rgba8.into(),
            )
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;
        Ok(out)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn encode_jpeg(&self, buffer: &PixelBuffer) -> RenderResult<Vec<u8>> {
        let mut rgb = Vec::with_capacity(buffer.width() as usize * buffer.height() as usize * 3);
        for color in buffer.colors() {
            let alpha = f32::from(color.a) / 255.0;
            let white = 255.0 * (1.0 - alpha);
            rgb.push(f32::from(color.r).mul_add(alpha, white) as u8);
            rgb.push(f32::from(color.g).mul_add(alpha, white) as u8);
            rgb.push(f32::from(color.b).mul_add(alpha, white) as u8);
        }

        let mut out = std::io::Cursor::new(Vec::new());
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, self.jpeg_quality)
            .write_image(
                &rgb,
                buffer.width(),
                buffer.height(),
                image::ColorType::Rgb8.into(),
            )
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;
        Ok(out.into_inner())
    }
}

impl Default for SnapshotExporter {
    fn default() -> Self {
        Self::new(85)
    }
}
