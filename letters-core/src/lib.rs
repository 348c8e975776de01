//! # Letters Core
//!
//! Core logic for handwritten letter practice.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                letters-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Capture          │  Decision               │
//! │  - Input events   │  - Prediction results   │
//! │  - Stroke record  │  - Lesson state machine │
//! │  - Pencil palette │  - Feedback events      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Rasterization and classification live in `letters-renderer` and
//! `letters-classifier`; the async driver tying them together lives in
//! `letters-tutor`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod event;
pub mod feedback;
pub mod lesson;
pub mod prediction;
pub mod recorder;
pub mod state;
pub mod stroke;

pub use error::{ErrorKind, LettersError, LettersResult};
pub use event::{InputEvent, TouchEvent, TouchPhase, TouchPoint};
pub use feedback::LessonEvent;
pub use lesson::{LessonConfig, LessonSession, LessonState, Verdict, DEFAULT_CONFIDENCE_THRESHOLD};
pub use prediction::{LabelScore, PredictionResult};
pub use recorder::StrokeRecorder;
pub use state::{CanvasSize, CanvasState};
pub use stroke::{Pencil, Point, Stroke, StrokeColor, StrokeId};

/// Letters core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
