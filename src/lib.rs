//! Offline facial emotion detection.
//!
//! Feeds 48x48 grayscale crops into a pretrained 7-class emotion model and
//! collapses a short burst of per-frame outputs into one reported result
//! with a confidence tier. The aggregator at the core is a pure function;
//! frame sources, the classifier, and the history log are injected at the
//! edges.

pub mod analysis;
pub mod classify;
pub mod config;
pub mod frame;
pub mod hints;
pub mod history;

pub use analysis::{
    aggregate, AggregateError, AggregateResult, SampleError, SamplerConfig, Strategy,
    ThresholdConfig, ThresholdRule, Tier,
};
pub use classify::{Classifier, ClassifyError, Distribution, Label};
pub use config::Config;
pub use frame::{CaptureError, FrameSource, ImageSample};
pub use history::{HistoryEntry, HistoryLog};
