//! # Letters Tutor
//!
//! Lesson driver and headless host for the letter-writing tutor.
//!
//! ## Usage
//!
//! ```bash
//! # Replay recorded drawings through a lesson
//! cargo run -p letters-tutor -- lesson --drawings letters-tutor/assets/sample-drawings.json
//!
//! # Save what the classifier sees for one attempt
//! cargo run -p letters-tutor -- rasterize --drawings drawings.json --attempt 2 --out seen.png
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `TutorConfig` - Model path, lesson, rasterizer and classifier settings
//! - `Tutor` - Owns canvas and lesson state; evaluates submissions in the background
//! - `DrawingScript` - Recorded attempts replayed through a `Tutor`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod script;
mod tutor;

pub use error::{TutorError, TutorResult};
pub use script::{replay, Attempt, DrawingScript, Replay};
pub use tutor::{Command, Completion, Tutor};

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use letters_classifier::ClassifierConfig;
use letters_core::{CanvasSize, LessonConfig, DEFAULT_CONFIDENCE_THRESHOLD};
use letters_renderer::{RasterConfig, DEFAULT_STROKE_WIDTH};

/// Command-line arguments for letters-tutor.
#[derive(Debug, Clone, Parser)]
#[command(name = "letters-tutor")]
#[command(about = "Handwritten letter lessons with on-device recognition")]
#[command(version)]
pub struct CliArgs {
    /// Model artifact (JSON linear model). Defaults to the bundled model.
    #[arg(long, env = "LETTERS_MODEL", global = true)]
    pub model: Option<PathBuf>,

    /// Letters to practice, in order (comma separated)
    #[arg(
        long,
        env = "LETTERS_CURRICULUM",
        value_delimiter = ',',
        default_value = "A,B,C,D,E",
        global = true
    )]
    pub curriculum: Vec<String>,

    /// A prediction must be more confident than this to count
    #[arg(long, env = "LETTERS_THRESHOLD", default_value_t = DEFAULT_CONFIDENCE_THRESHOLD, global = true)]
    pub threshold: f32,

    /// Inference timeout in milliseconds
    #[arg(long, env = "LETTERS_TIMEOUT_MS", default_value_t = 10_000, global = true)]
    pub timeout_ms: u64,

    /// Stroke width in canvas units
    #[arg(long, default_value_t = DEFAULT_STROKE_WIDTH, global = true)]
    pub stroke_width: f32,

    /// What to do
    #[command(subcommand)]
    pub action: Action,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Action {
    /// Replay recorded drawings through a lesson and report each verdict
    Lesson {
        /// Drawing script (JSON)
        #[arg(long)]
        drawings: PathBuf,
    },
    /// Rasterize one recorded attempt to PNG or JPEG
    Rasterize {
        /// Drawing script (JSON)
        #[arg(long)]
        drawings: PathBuf,
        /// Attempt to render
        #[arg(long, default_value_t = 0)]
        attempt: usize,
        /// Output image; the extension picks the format
        #[arg(long)]
        out: PathBuf,
    },
}

/// Tutor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TutorConfig {
    /// Model artifact to load on first submission.
    pub model: PathBuf,
    /// Curriculum and threshold.
    pub lesson: LessonConfig,
    /// How submissions are rendered.
    pub raster: RasterConfig,
    /// Inference settings.
    pub classifier: ClassifierConfig,
    /// Viewport size of the drawing surface.
    pub canvas: CanvasSize,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TutorConfig {
    /// Create a configuration with default values and the bundled model.
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: Self::bundled_model(),
            lesson: LessonConfig::default(),
            raster: RasterConfig::default(),
            classifier: ClassifierConfig::default(),
            canvas: CanvasSize::default(),
        }
    }

    /// Path of the model shipped with this crate.
    #[must_use]
    pub fn bundled_model() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/letters-linear.json")
    }
}

impl From<&CliArgs> for TutorConfig {
    fn from(args: &CliArgs) -> Self {
        Self {
            model: args.model.clone().unwrap_or_else(Self::bundled_model),
            lesson: LessonConfig {
                curriculum: args
                    .curriculum
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                confidence_threshold: args.threshold,
            },
            raster: RasterConfig {
                stroke_width: args.stroke_width,
                ..RasterConfig::default()
            },
            classifier: ClassifierConfig {
                timeout: Duration::from_millis(args.timeout_ms),
            },
            canvas: CanvasSize::default(),
        }
    }
}
