//! Lazily loaded, shared model.
//!
//! The model is loaded at most once, on first use, off the async runtime.
//! A failed load is not cached, so the next request retries it.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::OnceCell;

use crate::error::{ClassifierError, ClassifierResult};
use crate::linear::LinearModel;
use crate::model::ImageModel;

/// A function that produces a model.
pub type ModelLoader = Arc<dyn Fn() -> ClassifierResult<Arc<dyn ImageModel>> + Send + Sync>;

/// Where a model comes from.
#[derive(Clone)]
pub enum ModelSource {
    /// A [`LinearModel`] JSON artifact on disk.
    Path(PathBuf),
    /// A custom loader.
    Loader(ModelLoader),
}

impl ModelSource {
    fn load(&self) -> ClassifierResult<Arc<dyn ImageModel>> {
        match self {
            Self::Path(path) => Ok(Arc::new(LinearModel::load(path)?)),
            Self::Loader(loader) => loader(),
        }
    }
}

impl std::fmt::Debug for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Loader(_) => f.write_str("Loader(..)"),
        }
    }
}

/// Shared handle to a model that loads on first use.
#[derive(Debug)]
pub struct ModelHandle {
    source: ModelSource,
    model: OnceCell<Arc<dyn ImageModel>>,
    loads: AtomicUsize,
}

impl ModelHandle {
    /// Create a handle for `source`. Nothing is loaded yet.
    #[must_use]
    pub fn new(source: ModelSource) -> Self {
        Self {
            source,
            model: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Handle for a JSON artifact on disk.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(ModelSource::Path(path.into()))
    }

    /// Handle backed by a custom loader.
    #[must_use]
    pub fn from_loader<F>(loader: F) -> Self
    where
        F: Fn() -> ClassifierResult<Arc<dyn ImageModel>> + Send + Sync + 'static,
    {
        Self::new(ModelSource::Loader(Arc::new(loader)))
    }

    /// Handle around a model that is already in memory.
    #[must_use]
    pub fn preloaded(model: Arc<dyn ImageModel>) -> Self {
        let cached = Arc::clone(&model);
        Self {
            source: ModelSource::Loader(Arc::new(move || Ok(Arc::clone(&cached)))),
            model: OnceCell::new_with(Some(model)),
            loads: AtomicUsize::new(0),
        }
    }

    /// Where the model comes from.
    #[must_use]
    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    /// Whether the model is resident.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// How many times the source has been loaded successfully.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Get the model, loading it on first call.
    ///
    /// Concurrent callers wait on the same load.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ModelLoad`] (or the loader's own error) if
    /// loading fails. The failure is not cached.
    pub async fn get(&self) -> ClassifierResult<Arc<dyn ImageModel>> {
        self.model
            .get_or_try_init(|| self.load())
            .await
            .map(Arc::clone)
    }

    async fn load(&self) -> ClassifierResult<Arc<dyn ImageModel>> {
        let source = self.source.clone();
        let started = Instant::now();

        let result = tokio::task::spawn_blocking(move || source.load())
            .await
            .map_err(|e| ClassifierError::ModelLoad(format!("loader task failed: {e}")))?;

        match result {
            Ok(model) => {
                self.loads.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    labels = model.labels().len(),
                    input = %model.signature(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "Model loaded"
                );
                Ok(model)
            }
            Err(e) => {
                tracing::warn!(source = ?self.source, error = %e, "Model load failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InputSignature;
    use letters_renderer::{PixelBuffer, PixelFormat};
    use std::sync::atomic::AtomicBool;

    struct Constant;

    impl ImageModel for Constant {
        fn signature(&self) -> InputSignature {
            InputSignature {
                width: 2,
                height: 2,
                format: PixelFormat::Rgba8,
            }
        }

        fn labels(&self) -> &[String] {
            &[]
        }

        fn predict(&self, _input: &PixelBuffer) -> ClassifierResult<Vec<f32>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_loads_once_across_calls() {
        let handle = ModelHandle::from_loader(|| Ok(Arc::new(Constant) as Arc<dyn ImageModel>));
        assert!(!handle.is_loaded());

        handle.get().await.unwrap();
        handle.get().await.unwrap();

        assert!(handle.is_loaded());
        assert_eq!(handle.load_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_calls_share_one_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = Arc::new(ModelHandle::from_loader(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(100));
            Ok(Arc::new(Constant) as Arc<dyn ImageModel>)
        }));

        let barrier = Arc::new(tokio::sync::Barrier::new(8));
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let handle = Arc::clone(&handle);
                let barrier = Arc::clone(&barrier);
                tokio::spawn(async move {
                    barrier.wait().await;
                    handle.get().await.map(|_| ())
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.load_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let fail_next = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&fail_next);
        let handle = ModelHandle::from_loader(move || {
            if flag.swap(false, Ordering::SeqCst) {
                Err(ClassifierError::ModelLoad("not yet".into()))
            } else {
                Ok(Arc::new(Constant) as Arc<dyn ImageModel>)
            }
        });

        assert!(handle.get().await.is_err());
        assert!(!handle.is_loaded());
        assert!(handle.get().await.is_ok());
        assert_eq!(handle.load_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_model_load_error() {
        let handle = ModelHandle::from_path("/nonexistent/letters-model.json");
        let err = handle.get().await.unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad(_)));
        assert_eq!(err.kind(), letters_core::ErrorKind::Inference);
    }

    #[tokio::test]
    async fn test_preloaded_never_loads() {
        let handle = ModelHandle::preloaded(Arc::new(Constant));
        assert!(handle.is_loaded());
        handle.get().await.unwrap();
        assert_eq!(handle.load_count(), 0);
    }
}
