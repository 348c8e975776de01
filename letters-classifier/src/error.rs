//! Classifier error types.

use std::time::Duration;

use letters_core::{ErrorKind, LettersError};
use thiserror::Error;

use crate::model::InputSignature;

/// Result type for classifier operations.
pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Errors that can occur while loading a model or classifying a buffer.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The buffer does not match the model's declared input.
    #[error("Input mismatch: model expects {expected}, got {actual}")]
    InputMismatch {
        /// What the model declares.
        expected: InputSignature,
        /// What was submitted.
        actual: InputSignature,
    },

    /// The model failed or returned nothing usable.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Inference did not finish in time.
    #[error("Inference timed out after {0:?}")]
    Timeout(Duration),

    /// The model artifact could not be loaded.
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    /// I/O error reading a model artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed model artifact.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClassifierError {
    /// User-facing failure category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputMismatch { .. } => ErrorKind::InputMismatch,
            Self::Inference(_)
            | Self::Timeout(_)
            | Self::ModelLoad(_)
            | Self::Io(_)
            | Self::Serialization(_) => ErrorKind::Inference,
        }
    }
}

impl From<ClassifierError> for LettersError {
    fn from(err: ClassifierError) -> Self {
        match err.kind() {
            ErrorKind::InputMismatch => Self::InputMismatch(err.to_string()),
            _ => Self::Inference(err.to_string()),
        }
    }
}
