//! A small JSON-described linear softmax classifier.
//!
//! The artifact stores one weight row per label over a coarse ink grid.
//! Each grid cell contributes the mean ink intensity of the pixels it
//! covers, where ink is `1 - luma` after compositing onto white. The
//! feature vector is scaled to unit length, so pencil color and stroke
//! weight change its magnitude but not its direction.
//!
//! ```json
//! {
//!   "name": "letters-linear",
//!   "input": { "width": 224, "height": 224, "format": "bgra8" },
//!   "grid": 8,
//!   "labels": ["A", "B"],
//!   "weights": [[0.1, ...], [0.2, ...]],
//!   "bias": [0.0, 0.0]
//! }
//! ```

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use letters_renderer::PixelBuffer;

use crate::error::{ClassifierError, ClassifierResult};
use crate::model::{ImageModel, InputSignature};

/// A linear classifier over grid-averaged ink features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default = "default_name")]
    name: String,
    input: InputSignature,
    grid: u32,
    labels: Vec<String>,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

fn default_name() -> String {
    "linear".to_string()
}

impl LinearModel {
    /// Build and validate a model.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ModelLoad`] if the shapes are inconsistent.
    pub fn new(
        name: impl Into<String>,
        input: InputSignature,
        grid: u32,
        labels: Vec<String>,
        weights: Vec<Vec<f32>>,
        bias: Vec<f32>,
    ) -> ClassifierResult<Self> {
        let model = Self {
            name: name.into(),
            input,
            grid,
            labels,
            weights,
            bias,
        };
        model.validate()?;
        Ok(model)
    }

    /// Parse a model from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the shapes are inconsistent.
    pub fn from_json(json: &str) -> ClassifierResult<Self> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Parse a model from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or parsing fails.
    pub fn from_reader(reader: impl Read) -> ClassifierResult<Self> {
        let model: Self = serde_json::from_reader(reader)?;
        model.validate()?;
        Ok(model)
    }

    /// Load a model artifact from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a valid model.
    pub fn load(path: impl AsRef<Path>) -> ClassifierResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            ClassifierError::ModelLoad(format!("cannot open {}: {e}", path.display()))
        })?;
        let model = Self::from_reader(std::io::BufReader::new(file))?;
        tracing::debug!(
            path = %path.display(),
            name = %model.name,
            labels = model.labels.len(),
            grid = model.grid,
            "Loaded linear model"
        );
        Ok(model)
    }

    /// Serialize the model to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> ClassifierResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid side length.
    #[must_use]
    pub fn grid(&self) -> u32 {
        self.grid
    }

    fn feature_len(&self) -> usize {
        let g = self.grid as usize;
        g * g
    }

    fn validate(&self) -> ClassifierResult<()> {
        let fail = |msg: String| -> ClassifierResult<()> { Err(ClassifierError::ModelLoad(msg)) };

        if self.labels.is_empty() {
            return fail("model declares no labels".into());
        }
        if self.input.width == 0 || self.input.height == 0 {
            return fail(format!("input size must be non-zero, got {}", self.input));
        }
        if self.grid == 0 || self.grid > self.input.width || self.grid > self.input.height {
            return fail(format!(
                "grid {} does not fit input {}",
                self.grid, self.input
            ));
        }
        if self.weights.len() != self.labels.len() {
            return fail(format!(
                "{} weight rows for {} labels",
                self.weights.len(),
                self.labels.len()
            ));
        }
        if self.bias.len() != self.labels.len() {
            return fail(format!(
                "{} biases for {} labels",
                self.bias.len(),
                self.labels.len()
            ));
        }
        let features = self.feature_len();
        if let Some((row, w)) = self
            .weights
            .iter()
            .enumerate()
            .find(|(_, w)| w.len() != features)
        {
            return fail(format!(
                "weight row {row} has {} entries, expected {features}",
                w.len()
            ));
        }
        let all_finite = self
            .weights
            .iter()
            .flatten()
            .chain(self.bias.iter())
            .all(|v| v.is_finite());
        if !all_finite {
            return fail("model parameters must be finite".into());
        }
        Ok(())
    }

    /// Mean ink intensity per grid cell, row-major, scaled to unit length.
    ///
    /// A blank buffer yields all zeros.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn features(&self, input: &PixelBuffer) -> Vec<f32> {
        let g = self.grid as usize;
        let width = input.width() as usize;
        let height = input.height() as usize;
        let mut sums = vec![0.0_f32; g * g];
        let mut counts = vec![0_u32; g * g];

        for (i, color) in input.colors().enumerate() {
            let x = i % width;
            let y = i / width;
            let cell = (y * g / height) * g + (x * g / width);

            let alpha = f32::from(color.a) / 255.0;
            let luma = 0.299 * f32::from(color.r)
                + 0.587 * f32::from(color.g)
                + 0.114 * f32::from(color.b);
            let composited = luma * alpha + 255.0 * (1.0 - alpha);

            sums[cell] += 1.0 - composited / 255.0;
            counts[cell] += 1;
        }

        let mut features: Vec<f32> = sums
            .iter()
            .zip(&counts)
            .map(|(sum, &n)| if n == 0 { 0.0 } else { sum / n as f32 })
            .collect();

        let norm = features.iter().map(|f| f * f).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            features.iter_mut().for_each(|f| *f /= norm);
        }
        features
    }
}

impl ImageModel for LinearModel {
    fn signature(&self) -> InputSignature {
        self.input
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict(&self, input: &PixelBuffer) -> ClassifierResult<Vec<f32>> {
        if !self.input.accepts(input) {
            return Err(ClassifierError::InputMismatch {
                expected: self.input,
                actual: InputSignature::of(input),
            });
        }

        let x = self.features(input);
        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| b + row.iter().zip(&x).map(|(w, v)| w * v).sum::<f32>())
            .collect();
        Ok(softmax(&logits))
    }
}

/// Numerically stable softmax.
#[must_use]
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
