//! Emotion classification: the fixed label set and the model seam.

mod label;
mod provider;

pub use label::{Distribution, Label, ALL_LABELS};
pub use provider::{Classifier, ClassifyError, OnnxClassifier, OnnxConfig};
