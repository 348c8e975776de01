//! Renderer error types.

use letters_core::{ErrorKind, LettersError};
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rasterization.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A stroke without any points.
    #[error("Stroke {index} has no points")]
    EmptyStroke {
        /// Position of the stroke in drawing order.
        index: usize,
    },

    /// A stroke point with a NaN or infinite coordinate.
    #[error("Stroke {index} has a non-finite point")]
    NonFinitePoint {
        /// Position of the stroke in drawing order.
        index: usize,
    },

    /// Source or output size that cannot be rendered.
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Drawing surface could not be created.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Snapshot encoding failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl RenderError {
    /// Every rendering failure is reported as [`ErrorKind::Render`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Render
    }
}

impl From<RenderError> for LettersError {
    fn from(err: RenderError) -> Self {
        Self::Render(err.to_string())
    }
}
