//! Lesson events for the presentation layer.
//!
//! The core never plays sounds or shows screens; it emits discrete events
//! and a suggested message for each.

use serde::{Deserialize, Serialize};

use crate::{ErrorKind, Verdict};

/// Something the learner should be told about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LessonEvent {
    /// A new target is ready to be written.
    Prompt {
        /// Position in the curriculum.
        index: usize,
        /// Letter to write.
        target: String,
    },
    /// The drawing was recognized as the target.
    Success {
        /// Letter that was asked for.
        target: String,
        /// Predicted label.
        label: String,
        /// Its confidence.
        confidence: f32,
    },
    /// The drawing was not recognized as the target.
    Failure {
        /// Letter that was asked for.
        target: String,
        /// Predicted label.
        label: String,
        /// Its confidence.
        confidence: f32,
    },
    /// The drawing could not be evaluated.
    Error {
        /// Letter that was asked for.
        target: String,
        /// Failure category.
        kind: ErrorKind,
        /// Diagnostic detail, not meant for the learner.
        detail: String,
    },
    /// The whole curriculum is done.
    Complete,
}

impl LessonEvent {
    /// Event reporting `verdict` for `target`.
    #[must_use]
    pub fn from_verdict(target: &str, verdict: Verdict) -> Self {
        let target = target.to_string();
        match verdict {
            Verdict::Success { label, confidence } => Self::Success {
                target,
                label,
                confidence,
            },
            Verdict::Mismatch { label, confidence } => Self::Failure {
                target,
                label,
                confidence,
            },
            Verdict::Error { kind, detail } => Self::Error {
                target,
                kind,
                detail,
            },
        }
    }

    /// Message to show the learner.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Prompt { target, .. } => format!(
                "Pick a color of your choice and write the letter {target}! \
                 When you are done, your virtual tutor will give you feedback."
            ),
            Self::Success { target, .. } => format!(
                "Congrats, you just wrote the letter {target} correctly! \
                 Now you can move on and learn how to write a new letter."
            ),
            Self::Failure { .. } => "Looks like you did not write the letter correctly! \
                 No problem, clear the canvas and try again."
                .to_string(),
            Self::Error { .. } => "An error occurred while trying to correct your answer! \
                 Please try again."
                .to_string(),
            Self::Complete => {
                "Congrats, you were able to write every letter of the lesson correctly!"
                    .to_string()
            }
        }
    }

    /// Short name of the event kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Prompt { .. } => "prompt",
            Self::Success { .. } => "success",
            Self::Failure { .. } => "failure",
            Self::Error { .. } => "error",
            Self::Complete => "complete",
        }
    }
}
