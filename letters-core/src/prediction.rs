//! Classifier output handed to the lesson.

use serde::{Deserialize, Serialize};

use crate::{ErrorKind, LettersError};

/// A label with its probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    /// Class label.
    pub label: String,
    /// Probability in [0, 1].
    pub probability: f32,
}

/// Outcome of one classification: a label or a failure, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionResult {
    /// The most probable label.
    Label {
        /// Predicted label.
        label: String,
        /// Confidence in [0, 1].
        confidence: f32,
    },
    /// The pipeline failed before producing a label.
    Failed {
        /// Failure category.
        kind: ErrorKind,
        /// Diagnostic detail for logs.
        detail: String,
    },
}

impl PredictionResult {
    /// Build a successful result, clamping the confidence into [0, 1].
    #[must_use]
    pub fn label(label: impl Into<String>, confidence: f32) -> Self {
        Self::Label {
            label: label.into(),
            confidence: clamp_confidence(confidence),
        }
    }

    /// Build a failed result.
    #[must_use]
    pub fn failed(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            detail: detail.into(),
        }
    }

    /// Whether a label was produced.
    #[must_use]
    pub fn is_label(&self) -> bool {
        matches!(self, Self::Label { .. })
    }

    /// Failure category, if this is a failure.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Label { .. } => None,
            Self::Failed { kind, .. } => Some(*kind),
        }
    }
}

/// Clamp a confidence into [0, 1]; NaN counts as no confidence.
#[must_use]
pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

impl From<&LettersError> for PredictionResult {
    fn from(err: &LettersError) -> Self {
        Self::failed(err.kind(), err.to_string())
    }
}

impl From<LabelScore> for PredictionResult {
    fn from(score: LabelScore) -> Self {
        Self::label(score.label, score.probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(
            PredictionResult::label("A", 1.5),
            PredictionResult::Label {
                label: "A".into(),
                confidence: 1.0
            }
        );
        assert_eq!(
            PredictionResult::label("A", f32::NAN),
            PredictionResult::Label {
                label: "A".into(),
                confidence: 0.0
            }
        );
    }

    #[test]
    fn test_from_error() {
        let result = PredictionResult::from(&LettersError::Inference("no result".into()));
        assert_eq!(result.error_kind(), Some(ErrorKind::Inference));
        assert!(!result.is_label());
    }

    #[test]
    fn test_json_tagging() {
        let json = serde_json::to_value(PredictionResult::failed(ErrorKind::Render, "bad"))
            .expect("serialize");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "render");
    }
}
