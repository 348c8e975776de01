//! The model seam.

use serde::{Deserialize, Serialize};

use letters_renderer::{PixelBuffer, PixelFormat};

use crate::error::ClassifierResult;

/// The input a model declares it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputSignature {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub format: PixelFormat,
}

impl InputSignature {
    /// Signature describing an existing buffer.
    #[must_use]
    pub fn of(buffer: &PixelBuffer) -> Self {
        Self {
            width: buffer.width(),
            height: buffer.height(),
            format: buffer.format(),
        }
    }

    /// Whether `buffer` can be fed to a model with this signature.
    #[must_use]
    pub fn accepts(&self, buffer: &PixelBuffer) -> bool {
        *self == Self::of(buffer)
    }
}

impl std::fmt::Display for InputSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.format)
    }
}

/// A loaded, immutable image classification model.
///
/// Implementations are shared across threads and must not require mutation
/// to predict.
pub trait ImageModel: Send + Sync {
    /// Declared input.
    fn signature(&self) -> InputSignature;

    /// Class labels, in output order.
    fn labels(&self) -> &[String];

    /// Probability of each label for `input`, in [`ImageModel::labels`] order.
    ///
    /// Callers validate `input` against [`ImageModel::signature`] first.
    ///
    /// # Errors
    ///
    /// Returns an error if the forward pass fails.
    fn predict(&self, input: &PixelBuffer) -> ClassifierResult<Vec<f32>>;
}

impl std::fmt::Debug for dyn ImageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageModel")
            .field("signature", &self.signature())
            .field("labels", &self.labels().len())
            .finish()
    }
}
