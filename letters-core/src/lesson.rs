//! # Lesson session
//!
//! Walks the learner through an ordered curriculum of letters.
//!
//! ```text
//! AwaitingSubmission(i) --submit--> Evaluating(i)
//! Evaluating(i) --label == target[i] && confidence > threshold--> Advanced(i)
//! Evaluating(i) --anything else--> Retry(i)
//! Advanced(i) --proceed, i last--> Complete
//! Advanced(i) --proceed--> AwaitingSubmission(i + 1)
//! Retry(i) --clear--> AwaitingSubmission(i)
//! ```

use serde::{Deserialize, Serialize};

use crate::prediction::clamp_confidence;
use crate::{ErrorKind, LettersError, LettersResult, PredictionResult};

/// Default qualifying confidence.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.9;

/// Configuration for a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonConfig {
    /// Target labels in teaching order.
    pub curriculum: Vec<String>,
    /// A prediction must be strictly above this to count.
    pub confidence_threshold: f32,
}

impl LessonConfig {
    /// Default curriculum: the first five letters.
    #[must_use]
    pub fn default_curriculum() -> Vec<String> {
        ["A", "B", "C", "D", "E"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            curriculum: Self::default_curriculum(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Where the lesson stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum LessonState {
    /// Waiting for the learner to submit a drawing of `target[i]`.
    AwaitingSubmission(usize),
    /// A drawing of `target[i]` is being classified.
    Evaluating(usize),
    /// `target[i]` was written correctly.
    Advanced(usize),
    /// The attempt at `target[i]` did not qualify; the canvas must be cleared.
    Retry(usize),
    /// Every target was written correctly.
    Complete,
}

impl LessonState {
    /// Index of the current target, if the lesson is not complete.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        match self {
            Self::AwaitingSubmission(i)
            | Self::Evaluating(i)
            | Self::Advanced(i)
            | Self::Retry(i) => Some(i),
            Self::Complete => None,
        }
    }
}

/// Decision taken on one classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Correct label with enough confidence.
    Success {
        /// Predicted label.
        label: String,
        /// Its confidence.
        confidence: f32,
    },
    /// Wrong label, or right label with too little confidence.
    Mismatch {
        /// Predicted label.
        label: String,
        /// Its confidence.
        confidence: f32,
    },
    /// The pipeline failed.
    Error {
        /// Failure category.
        kind: ErrorKind,
        /// Diagnostic detail.
        detail: String,
    },
}

impl Verdict {
    /// Whether the attempt qualified.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Curriculum progress and the decision logic for each attempt.
#[derive(Debug, Clone)]
pub struct LessonSession {
    curriculum: Vec<String>,
    threshold: f32,
    state: LessonState,
}

impl LessonSession {
    /// Start a lesson at the first target.
    ///
    /// # Errors
    ///
    /// Returns [`LettersError::Config`] if the curriculum is empty or the
    /// threshold is outside [0, 1].
    pub fn new(config: LessonConfig) -> LettersResult<Self> {
        if config.curriculum.is_empty() {
            return Err(LettersError::Config(
                "curriculum must contain at least one target".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&config.confidence_threshold) {
            return Err(LettersError::Config(format!(
                "confidence threshold {} is outside [0, 1]",
                config.confidence_threshold
            )));
        }
        Ok(Self {
            curriculum: config.curriculum,
            threshold: config.confidence_threshold,
            state: LessonState::AwaitingSubmission(0),
        })
    }

    /// Start a lesson over `targets` with the default threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if `targets` is empty.
    pub fn with_targets<I, S>(targets: I) -> LettersResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(LessonConfig {
            curriculum: targets.into_iter().map(Into::into).collect(),
            ..LessonConfig::default()
        })
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LessonState {
        self.state
    }

    /// Label the learner should currently write.
    #[must_use]
    pub fn current_target(&self) -> Option<&str> {
        self.state
            .index()
            .and_then(|i| self.curriculum.get(i))
            .map(String::as_str)
    }

    /// The curriculum.
    #[must_use]
    pub fn curriculum(&self) -> &[String] {
        &self.curriculum
    }

    /// Qualifying threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Whether every target has been completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == LessonState::Complete
    }

    /// Whether a submission would currently be accepted.
    #[must_use]
    pub fn accepts_submission(&self) -> bool {
        matches!(self.state, LessonState::AwaitingSubmission(_))
    }

    /// Begin evaluating a drawing of the current target.
    ///
    /// # Errors
    ///
    /// Returns [`LettersError::InvalidState`] unless awaiting a submission;
    /// in particular while another evaluation is outstanding.
    pub fn submit(&mut self) -> LettersResult<usize> {
        match self.state {
            LessonState::AwaitingSubmission(i) => {
                self.state = LessonState::Evaluating(i);
                Ok(i)
            }
            other => Err(LettersError::InvalidState(format!(
                "cannot submit while {other:?}"
            ))),
        }
    }

    /// Decide on a classification of the drawing under evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`LettersError::InvalidState`] unless evaluating.
    pub fn resolve(&mut self, result: &PredictionResult) -> LettersResult<Verdict> {
        let LessonState::Evaluating(i) = self.state else {
            return Err(LettersError::InvalidState(format!(
                "no evaluation in progress ({:?})",
                self.state
            )));
        };

        let verdict = match result {
            PredictionResult::Label { label, confidence } => {
                // Public fields and deserialization bypass `PredictionResult::label`.
                let confidence = clamp_confidence(*confidence);
                let qualifies = label == &self.curriculum[i] && confidence > self.threshold;
                if qualifies {
                    Verdict::Success {
                        label: label.clone(),
                        confidence,
                    }
                } else {
                    Verdict::Mismatch {
                        label: label.clone(),
                        confidence,
                    }
                }
            }
            PredictionResult::Failed { kind, detail } => Verdict::Error {
                kind: *kind,
                detail: detail.clone(),
            },
        };

        self.state = if verdict.is_success() {
            LessonState::Advanced(i)
        } else {
            LessonState::Retry(i)
        };
        tracing::info!(
            target_label = %self.curriculum[i],
            state = ?self.state,
            "Resolved attempt: {verdict:?}"
        );
        Ok(verdict)
    }

    /// Move past a successful attempt.
    ///
    /// # Errors
    ///
    /// Returns [`LettersError::InvalidState`] unless advanced.
    pub fn proceed(&mut self) -> LettersResult<LessonState> {
        let LessonState::Advanced(i) = self.state else {
            return Err(LettersError::InvalidState(format!(
                "nothing to proceed from ({:?})",
                self.state
            )));
        };
        self.state = if i + 1 >= self.curriculum.len() {
            LessonState::Complete
        } else {
            LessonState::AwaitingSubmission(i + 1)
        };
        Ok(self.state)
    }

    /// The canvas was cleared. Leaves `Retry` for the same target.
    pub fn clear(&mut self) -> LessonState {
        if let LessonState::Retry(i) = self.state {
            self.state = LessonState::AwaitingSubmission(i);
        }
        self.state
    }
}
