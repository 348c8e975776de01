//! Error types for stroke capture and lesson operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for core operations.
pub type LettersResult<T> = Result<T, LettersError>;

/// Errors that can occur in the core pipeline.
#[derive(Debug, Error)]
pub enum LettersError {
    /// Protocol misuse, e.g. beginning a stroke while one is open.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed stroke data reached the rasterizer.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Pixel buffer does not match the model's input signature.
    #[error("Input mismatch: {0}")]
    InputMismatch(String),

    /// Model invocation failed or produced nothing usable.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Invalid configuration (empty curriculum, threshold out of range).
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LettersError {
    /// Classify the error for user-facing feedback.
    ///
    /// Configuration and serialization problems surface as [`ErrorKind::InvalidState`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Render(_) => ErrorKind::Render,
            Self::InputMismatch(_) => ErrorKind::InputMismatch,
            Self::Inference(_) => ErrorKind::Inference,
            Self::InvalidState(_) | Self::Config(_) | Self::Serialization(_) => {
                ErrorKind::InvalidState
            }
        }
    }
}

/// The recoverable failure categories a lesson can report to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Protocol misuse.
    InvalidState,
    /// Stroke data could not be rasterized.
    Render,
    /// The rasterized buffer does not fit the model.
    InputMismatch,
    /// The classifier failed.
    Inference,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidState => "invalid state",
            Self::Render => "render",
            Self::InputMismatch => "input mismatch",
            Self::Inference => "inference",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            LettersError::Render("x".into()).kind(),
            ErrorKind::Render
        );
        assert_eq!(
            LettersError::Config("empty".into()).kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(ErrorKind::InputMismatch.to_string(), "input mismatch");
    }
}
