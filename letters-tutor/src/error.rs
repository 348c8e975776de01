//! Errors for the lesson driver and drawing scripts.

use letters_core::LettersError;
use thiserror::Error;

/// Result type for tutor operations.
pub type TutorResult<T> = Result<T, TutorError>;

/// Errors raised while loading scripts or driving a lesson.
#[derive(Debug, Error)]
pub enum TutorError {
    /// A lesson or canvas operation failed.
    #[error(transparent)]
    Lesson(#[from] LettersError),

    /// I/O error reading a script.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed script JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The script is well-formed JSON but not a usable drawing.
    #[error("Invalid drawing script: {0}")]
    Script(String),

    /// The driver task stopped abnormally.
    #[error("Lesson driver failed: {0}")]
    Driver(String),
}
