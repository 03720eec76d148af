//! Classifier seam and ONNX-backed emotion provider.
//!
//! The model is treated as an opaque function: one 48x48 grayscale sample in,
//! one score per emotion label out. Everything downstream (aggregation,
//! thresholds, history) works on the plain `Distribution` it returns.

use std::path::PathBuf;

use thiserror::Error;

#[cfg(feature = "onnx")]
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Value,
};

use super::label::Distribution;
#[cfg(feature = "onnx")]
use super::label::Label;
use crate::frame::ImageSample;

/// Errors that can occur during classification
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Model is not ready yet")]
    ModelNotReady,

    #[error("ONNX support not enabled (build with --features onnx)")]
    FeatureNotEnabled,
}

/// Maps one image sample to a per-label score vector.
///
/// Implementations are not assumed safe for concurrent in-flight calls;
/// callers serialize invocations (the sampling driver does this by
/// construction).
pub trait Classifier {
    fn predict(&mut self, sample: &ImageSample) -> Result<Distribution, ClassifyError>;

    /// Whether the model has finished loading and can accept samples.
    fn is_ready(&self) -> bool;
}

/// Configuration for the ONNX emotion classifier
#[derive(Debug, Clone)]
pub struct OnnxConfig {
    /// Path to the emotion model (.onnx)
    pub model_path: PathBuf,
    /// Number of threads for ONNX inference
    pub n_threads: usize,
}

impl Default for OnnxConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            n_threads: 1,
        }
    }
}

/// Emotion classifier backed by an ONNX model
#[cfg(feature = "onnx")]
pub struct OnnxClassifier {
    session: Session,
}

#[cfg(feature = "onnx")]
impl OnnxClassifier {
    /// Create a new classifier from a model file
    pub fn new(config: OnnxConfig) -> Result<Self, ClassifyError> {
        if !config.model_path.exists() {
            return Err(ClassifyError::ModelLoad(format!(
                "Model not found at {:?}",
                config.model_path
            )));
        }

        let session = Session::builder()
            .map_err(|e: ort::Error| ClassifyError::ModelLoad(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e: ort::Error| ClassifyError::ModelLoad(e.to_string()))?
            .with_intra_threads(config.n_threads)
            .map_err(|e: ort::Error| ClassifyError::ModelLoad(e.to_string()))?
            .commit_from_file(&config.model_path)
            .map_err(|e: ort::Error| ClassifyError::ModelLoad(e.to_string()))?;

        tracing::info!(
            "Emotion classifier initialized with model: {:?}",
            config.model_path
        );

        Ok(Self { session })
    }
}

#[cfg(feature = "onnx")]
impl Classifier for OnnxClassifier {
    fn predict(&mut self, sample: &ImageSample) -> Result<Distribution, ClassifyError> {
        // Model expects input shape [batch, height, width, channels]
        let input_shape = [1_usize, ImageSample::SIDE, ImageSample::SIDE, 1];

        let input_tensor = Value::from_array((input_shape, sample.pixels().to_vec()))
            .map_err(|e: ort::Error| ClassifyError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e: ort::Error| ClassifyError::Inference(e.to_string()))?;

        let output = outputs
            .iter()
            .next()
            .ok_or_else(|| ClassifyError::Inference("No output from model".to_string()))?;

        let output_tensor = output
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e: ort::Error| ClassifyError::Inference(e.to_string()))?;

        let scores: Vec<f32> = output_tensor.1.iter().copied().collect();

        // A wrong-shaped output must not be silently mapped onto the label
        // set; refuse rather than misreport.
        if scores.len() != Label::COUNT {
            return Err(ClassifyError::Inference(format!(
                "Unexpected output length {} (expected {})",
                scores.len(),
                Label::COUNT
            )));
        }

        if let Some((index, score)) = Distribution::new(scores.clone()).arg_max() {
            tracing::debug!(
                "Classifier top: {} ({:.3})",
                Label::from_index(index).map(|l| l.as_str()).unwrap_or("?"),
                score
            );
        }

        Ok(Distribution::new(scores))
    }

    fn is_ready(&self) -> bool {
        true
    }
}

// Stub implementation when the onnx feature is not enabled
#[cfg(not(feature = "onnx"))]
pub struct OnnxClassifier;

#[cfg(not(feature = "onnx"))]
impl OnnxClassifier {
    pub fn new(_config: OnnxConfig) -> Result<Self, ClassifyError> {
        Err(ClassifyError::FeatureNotEnabled)
    }
}

#[cfg(not(feature = "onnx"))]
impl Classifier for OnnxClassifier {
    fn predict(&mut self, _sample: &ImageSample) -> Result<Distribution, ClassifyError> {
        Err(ClassifyError::FeatureNotEnabled)
    }

    fn is_ready(&self) -> bool {
        false
    }
}
