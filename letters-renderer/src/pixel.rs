//! Fixed-format pixel buffers handed to the classifier.

use serde::{Deserialize, Serialize};

use letters_core::StrokeColor;

use crate::error::{RenderError, RenderResult};

/// Byte layout of a pixel. Both formats use 4 bytes with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Red, green, blue, alpha.
    Rgba8,
    /// Blue, green, red, alpha.
    Bgra8,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Encode a color in this layout.
    #[must_use]
    pub fn encode(self, color: StrokeColor) -> [u8; 4] {
        match self {
            Self::Rgba8 => [color.r, color.g, color.b, color.a],
            Self::Bgra8 => [color.b, color.g, color.r, color.a],
        }
    }

    /// Decode a pixel stored in this layout.
    #[must_use]
    pub fn decode(self, px: [u8; 4]) -> StrokeColor {
        match self {
            Self::Rgba8 => StrokeColor {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            },
            Self::Bgra8 => StrokeColor {
                r: px[2],
                g: px[1],
                b: px[0],
                a: px[3],
            },
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rgba8 => f.write_str("rgba8"),
            Self::Bgra8 => f.write_str("bgra8"),
        }
    }
}

/// A row-major grid of 4-byte pixels with stride `width * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw pixel bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` does not hold exactly `width * height` pixels.
    pub fn from_raw(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> RenderResult<Self> {
        let expected = Self::byte_len(width, height);
        if data.len() != expected {
            return Err(RenderError::InvalidDimensions(format!(
                "{width}x{height} {format} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// A buffer filled with one color.
    #[must_use]
    pub fn filled(width: u32, height: u32, format: PixelFormat, color: StrokeColor) -> Self {
        let px = format.encode(color);
        let data = px
            .iter()
            .copied()
            .cycle()
            .take(Self::byte_len(width, height))
            .collect();
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Wrap bytes already known to match the dimensions.
    pub(crate) fn from_parts(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), Self::byte_len(width, height));
        Self {
            width,
            height,
            format,
            data,
        }
    }

    fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * PixelFormat::BYTES_PER_PIXEL
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout.
    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes per row.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.width as usize * PixelFormat::BYTES_PER_PIXEL
    }

    /// Raw pixel bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Color of the pixel at (`x`, `y`), or `None` outside the buffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<StrokeColor> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride() + x as usize * PixelFormat::BYTES_PER_PIXEL;
        let px = self.data.get(offset..offset + PixelFormat::BYTES_PER_PIXEL)?;
        Some(self.format.decode([px[0], px[1], px[2], px[3]]))
    }

    /// Iterate over all pixel colors in row-major order.
    pub fn colors(&self) -> impl Iterator<Item = StrokeColor> + '_ {
        self.data
            .chunks_exact(PixelFormat::BYTES_PER_PIXEL)
            .map(|px| self.format.decode([px[0], px[1], px[2], px[3]]))
    }

    /// Whether every pixel has exactly `color`.
    #[must_use]
    pub fn is_uniform(&self, color: StrokeColor) -> bool {
        self.colors().all(|c| c == color)
    }

    /// Convert to straight RGBA bytes regardless of the stored layout.
    #[must_use]
    pub fn to_rgba(&self) -> Vec<u8> {
        match self.format {
            PixelFormat::Rgba8 => self.data.clone(),
            PixelFormat::Bgra8 => self
                .data
                .chunks_exact(PixelFormat::BYTES_PER_PIXEL)
                .flat_map(|px| [px[2], px[1], px[0], px[3]])
                .collect(),
        }
    }
}
