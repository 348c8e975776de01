//! Classifier adapter: validate, infer off-thread, report one result.

use std::sync::Arc;
use std::time::{Duration, Instant};

use letters_core::{ErrorKind, LabelScore, PredictionResult};
use letters_renderer::PixelBuffer;

use crate::error::{ClassifierError, ClassifierResult};
use crate::handle::ModelHandle;
use crate::model::{ImageModel, InputSignature};

/// Default upper bound on one inference.
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Classifier settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Maximum time a single inference may take.
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_INFERENCE_TIMEOUT,
        }
    }
}

/// Runs a shared model over rendered buffers.
///
/// Inference runs on the blocking pool so the caller's task, and the input
/// loop driving it, is never stalled by a forward pass.
#[derive(Debug, Clone)]
pub struct ClassifierAdapter {
    handle: Arc<ModelHandle>,
    config: ClassifierConfig,
}

impl ClassifierAdapter {
    /// Create an adapter over a shared model handle.
    #[must_use]
    pub fn new(handle: Arc<ModelHandle>, config: ClassifierConfig) -> Self {
        Self { handle, config }
    }

    /// The shared model handle.
    #[must_use]
    pub fn handle(&self) -> &Arc<ModelHandle> {
        &self.handle
    }

    /// Adapter settings.
    #[must_use]
    pub fn config(&self) -> ClassifierConfig {
        self.config
    }

    /// Classify `buffer`, returning the most probable label or a failure.
    ///
    /// Never panics and never returns both a label and an error. Failures
    /// are reported in the order of [`ClassifierAdapter::rank`].
    pub async fn classify(&self, buffer: PixelBuffer) -> PredictionResult {
        match self.rank(buffer).await {
            Ok(ranked) => match ranked.into_iter().next() {
                Some(top) => {
                    tracing::debug!(label = %top.label, confidence = top.probability, "Classified");
                    PredictionResult::from(top)
                }
                None => PredictionResult::failed(ErrorKind::Inference, "model produced no labels"),
            },
            Err(e) => {
                tracing::warn!(kind = %e.kind(), error = %e, "Classification failed");
                PredictionResult::failed(e.kind(), e.to_string())
            }
        }
    }

    /// All labels with their probabilities, most probable first.
    ///
    /// The model is resolved first, because its input signature is only
    /// known once loaded. A load failure therefore wins over a mismatched
    /// buffer and is reported as [`ErrorKind::Inference`].
    ///
    /// # Errors
    ///
    /// - [`ClassifierError::InputMismatch`] if `buffer` does not match the
    ///   model's input; the model is not invoked.
    /// - [`ClassifierError::Timeout`] if inference exceeds the configured bound.
    /// - [`ClassifierError::Inference`] if the model fails, panics, or returns
    ///   an unusable distribution.
    /// - Any error from loading the model.
    pub async fn rank(&self, buffer: PixelBuffer) -> ClassifierResult<Vec<LabelScore>> {
        let model = self.handle.get().await?;

        let expected = model.signature();
        if !expected.accepts(&buffer) {
            return Err(ClassifierError::InputMismatch {
                expected,
                actual: InputSignature::of(&buffer),
            });
        }

        let started = Instant::now();
        let worker: Arc<dyn ImageModel> = Arc::clone(&model);
        let job = tokio::task::spawn_blocking(move || worker.predict(&buffer));

        let probabilities = match tokio::time::timeout(self.config.timeout, job).await {
            Err(_) => return Err(ClassifierError::Timeout(self.config.timeout)),
            Ok(Err(join)) => {
                return Err(ClassifierError::Inference(format!(
                    "inference worker failed: {join}"
                )))
            }
            Ok(Ok(result)) => result?,
        };
        tracing::debug!(elapsed_ms = started.elapsed().as_millis(), "Inference finished");

        rank_distribution(model.labels(), &probabilities)
    }
}

/// Pair labels with probabilities and sort them, most probable first.
fn rank_distribution(labels: &[String], probabilities: &[f32]) -> ClassifierResult<Vec<LabelScore>> {
    if probabilities.is_empty() {
        return Err(ClassifierError::Inference("model returned no result".into()));
    }
    if probabilities.len() != labels.len() {
        return Err(ClassifierError::Inference(format!(
            "model returned {} scores for {} labels",
            probabilities.len(),
            labels.len()
        )));
    }
    if probabilities.iter().any(|p| !p.is_finite()) {
        return Err(ClassifierError::Inference(
            "model returned non-finite scores".into(),
        ));
    }

    let mut ranked: Vec<LabelScore> = labels
        .iter()
        .zip(probabilities)
        .map(|(label, &probability)| LabelScore {
            label: label.clone(),
            probability,
        })
        .collect();
    ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    Ok(ranked)
}
