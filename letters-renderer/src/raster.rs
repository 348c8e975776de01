//! Stroke rasterization.
//!
//! Paints strokes as round-capped polylines onto an opaque background with
//! tiny-skia, then converts the premultiplied pixmap into the straight-alpha
//! [`PixelBuffer`] layout the classifier expects.

use serde::{Deserialize, Serialize};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke as SkStroke,
    Transform,
};

use letters_core::{CanvasSize, Stroke, StrokeColor};

use crate::error::{RenderError, RenderResult};
use crate::pixel::{PixelBuffer, PixelFormat};

/// Default output edge length, matching the bundled model's input.
pub const DEFAULT_OUTPUT_SIZE: u32 = 224;

/// Default stroke width in canvas units.
pub const DEFAULT_STROKE_WIDTH: f32 = 5.0;

/// Smallest dot radius in output pixels.
const MIN_DOT_RADIUS: f32 = 0.5;

/// How canvas coordinates are mapped onto the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Uniform scale so the whole canvas fits, centered and letterboxed.
    #[default]
    Contain,
    /// Uniform scale so the canvas fills the output, centered and cropped.
    Cover,
    /// Independent horizontal and vertical scale.
    Stretch,
}

/// Configuration for the rasterizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output pixel layout.
    pub format: PixelFormat,
    /// Stroke width in canvas units (scaled with the canvas).
    pub stroke_width: f32,
    /// Background color.
    pub background: StrokeColor,
    /// Canvas-to-output mapping.
    pub fit: FitMode,
    /// Enable anti-aliasing.
    pub anti_alias: bool,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_OUTPUT_SIZE,
            height: DEFAULT_OUTPUT_SIZE,
            format: PixelFormat::Bgra8,
            stroke_width: DEFAULT_STROKE_WIDTH,
            background: StrokeColor::WHITE,
            fit: FitMode::Contain,
            anti_alias: true,
        }
    }
}

/// Renders stroke snapshots into fixed-size pixel buffers.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    config: RasterConfig,
}

impl Rasterizer {
    /// Create a rasterizer with the given configuration.
    #[must_use]
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }

    /// Create a rasterizer with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RasterConfig::default())
    }

    /// Get the rasterizer configuration.
    #[must_use]
    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// Render `strokes` drawn on a canvas of size `source` at the configured
    /// output size.
    ///
    /// # Errors
    ///
    /// Returns an error if a stroke has no points or a non-finite point, or
    /// if the source or output size is degenerate.
    pub fn rasterize(&self, strokes: &[Stroke], source: CanvasSize) -> RenderResult<PixelBuffer> {
        self.rasterize_with_size(strokes, source, self.config.width, self.config.height)
    }

    /// Render `strokes` at an explicit output size.
    ///
    /// # Errors
    ///
    /// See [`Rasterizer::rasterize`].
    pub fn rasterize_with_size(
        &self,
        strokes: &[Stroke],
        source: CanvasSize,
        width: u32,
        height: u32,
    ) -> RenderResult<PixelBuffer> {
        validate_strokes(strokes)?;
        let transform = self.canvas_transform(source, width, height)?;

        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RenderError::InvalidDimensions(format!("cannot allocate {width}x{height} surface"))
        })?;
        pixmap.fill(to_sk_color(self.config.background));

        for (index, stroke) in strokes.iter().enumerate() {
            self.paint_stroke(&mut pixmap, stroke, transform)
                .map_err(|e| {
                    tracing::warn!("Stroke {index} failed to render: {e}");
                    e
                })?;
        }

        tracing::debug!(
            "Rasterized {} strokes from {}x{} to {width}x{height} {}",
            strokes.len(),
            source.width,
            source.height,
            self.config.format
        );
        Ok(self.to_buffer(&pixmap))
    }

    /// Map canvas coordinates to output pixels.
    #[allow(clippy::cast_precision_loss)]
    fn canvas_transform(
        &self,
        source: CanvasSize,
        width: u32,
        height: u32,
    ) -> RenderResult<Transform> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions(format!(
                "output {width}x{height} is empty"
            )));
        }
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(source.width) || !valid(source.height) {
            return Err(RenderError::InvalidDimensions(format!(
                "canvas {}x{} is not drawable",
                source.width, source.height
            )));
        }

        let (out_w, out_h) = (width as f32, height as f32);
        let sx = out_w / source.width;
        let sy = out_h / source.height;

        let transform = match self.config.fit {
            FitMode::Stretch => Transform::from_scale(sx, sy),
            FitMode::Contain | FitMode::Cover => {
                let scale = if self.config.fit == FitMode::Contain {
                    sx.min(sy)
                } else {
                    sx.max(sy)
                };
                let tx = (out_w - source.width * scale) / 2.0;
                let ty = (out_h - source.height * scale) / 2.0;
                Transform::from_scale(scale, scale).post_translate(tx, ty)
            }
        };
        Ok(transform)
    }

    fn paint_stroke(
        &self,
        pixmap: &mut Pixmap,
        stroke: &Stroke,
        transform: Transform,
    ) -> RenderResult<()> {
        let mut paint = Paint::default();
        let color = stroke.color();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = self.config.anti_alias;

        let points = stroke.points();
        if stroke.is_dot() {
            // Sized in output pixels so a tap stays visible at any canvas scale.
            let center = points[0];
            let x = center.x * transform.sx + transform.tx;
            let y = center.y * transform.sy + transform.ty;
            let scale = transform.sx.min(transform.sy);
            let radius = (self.config.stroke_width / 2.0 * scale).max(MIN_DOT_RADIUS);
            let path = PathBuilder::from_circle(x, y, radius).ok_or_else(|| {
                RenderError::Surface(format!("cannot build dot of radius {radius}"))
            })?;
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            return Ok(());
        }

        let mut builder = PathBuilder::new();
        builder.move_to(points[0].x, points[0].y);
        for point in &points[1..] {
            builder.line_to(point.x, point.y);
        }
        let path = builder
            .finish()
            .ok_or_else(|| RenderError::Surface("stroke path is degenerate".to_string()))?;

        let sk_stroke = SkStroke {
            width: self.config.stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..SkStroke::default()
        };
        pixmap.stroke_path(&path, &paint, &sk_stroke, transform, None);
        Ok(())
    }

    fn to_buffer(&self, pixmap: &Pixmap) -> PixelBuffer {
        let format = self.config.format;
        let data = pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                format.encode(StrokeColor {
                    r: c.red(),
                    g: c.green(),
                    b: c.blue(),
                    a: c.alpha(),
                })
            })
            .collect();
        PixelBuffer::from_parts(pixmap.width(), pixmap.height(), format, data)
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn validate_strokes(strokes: &[Stroke]) -> RenderResult<()> {
    for (index, stroke) in strokes.iter().enumerate() {
        if stroke.is_empty() {
            return Err(RenderError::EmptyStroke { index });
        }
        if !stroke.points().iter().all(letters_core::Point::is_finite) {
            return Err(RenderError::NonFinitePoint { index });
        }
    }
    Ok(())
}

fn to_sk_color(color: StrokeColor) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}
