//! # Letters Classifier
//!
//! Runs an image classification model over rendered letter drawings.
//!
//! ## Flow
//!
//! ```text
//! PixelBuffer ──▶ validate against InputSignature ──▶ spawn_blocking(predict)
//!                        │ mismatch                        │ timeout / panic / bad output
//!                        ▼                                 ▼
//!               Failed(InputMismatch)              Failed(Inference)
//!                                                          │ ok
//!                                                          ▼
//!                                             Label { top label, confidence }
//! ```
//!
//! Models are loaded lazily through a shared [`ModelHandle`] and never
//! mutated after loading. [`LinearModel`] is the bundled JSON model format;
//! other models plug in through [`ImageModel`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adapter;
pub mod error;
pub mod handle;
pub mod linear;
pub mod model;

pub use adapter::{ClassifierAdapter, ClassifierConfig, DEFAULT_INFERENCE_TIMEOUT};
pub use error::{ClassifierError, ClassifierResult};
pub use handle::{ModelHandle, ModelLoader, ModelSource};
pub use linear::{softmax, LinearModel};
pub use model::{ImageModel, InputSignature};
