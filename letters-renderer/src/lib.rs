//! # Letters Renderer
//!
//! Turns captured strokes into the fixed-size pixel buffers a classifier
//! consumes.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌─────────────────┐
//! │ Stroke list  │──▶│ tiny-skia pixmap │──▶│ PixelBuffer     │
//! │ (canvas px)  │   │ (premultiplied)  │   │ (RGBA/BGRA, 4B) │
//! └──────────────┘   └──────────────────┘   └─────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
#[cfg(feature = "export")]
pub mod export;
pub mod pixel;
pub mod raster;

pub use error::{RenderError, RenderResult};
#[cfg(feature = "export")]
pub use export::{SnapshotExporter, SnapshotFormat};
pub use pixel::{PixelBuffer, PixelFormat};
pub use raster::{FitMode, RasterConfig, Rasterizer, DEFAULT_OUTPUT_SIZE, DEFAULT_STROKE_WIDTH};
