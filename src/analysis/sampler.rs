//! Sampling driver: collects repeated classifier outputs for aggregation.
//!
//! A bounded cooperative loop: capture a frame, classify it, sleep, repeat.
//! Classifier calls are serialized by construction (one in flight at a
//! time). Cancellation returns whatever prefix was collected; deciding
//! whether that prefix is usable is the aggregator's job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::classify::{Classifier, ClassifyError, Distribution};
use crate::frame::{CaptureError, FrameSource};

/// Errors from the sampling loop. Upstream failures propagate unchanged;
/// there is no internal retry.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// Sampling loop configuration
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Number of frames to classify per analysis
    pub sample_count: usize,
    /// Delay between consecutive samples
    pub sample_interval: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_count: 5,
            sample_interval: Duration::from_millis(200),
        }
    }
}

impl SamplerConfig {
    pub fn from_ms(sample_count: usize, sample_interval_ms: u64) -> Self {
        Self {
            sample_count,
            sample_interval: Duration::from_millis(sample_interval_ms),
        }
    }
}

/// Collect up to `sample_count` distributions, sleeping between samples.
///
/// Setting `stop_flag` ends the loop early and returns the prefix collected
/// so far, which may be empty if cancellation came before the first sample.
pub async fn collect_samples<S, C>(
    source: &mut S,
    classifier: &mut C,
    config: &SamplerConfig,
    stop_flag: Arc<AtomicBool>,
) -> Result<Vec<Distribution>, SampleError>
where
    S: FrameSource,
    C: Classifier,
{
    if !classifier.is_ready() {
        return Err(SampleError::Classify(ClassifyError::ModelNotReady));
    }

    let mut samples = Vec::with_capacity(config.sample_count);

    for i in 0..config.sample_count {
        if stop_flag.load(Ordering::SeqCst) {
            info!(
                "Sampling cancelled after {} of {} samples",
                samples.len(),
                config.sample_count
            );
            break;
        }

        let frame = source.capture()?;
        let distribution = classifier.predict(&frame)?;
        debug!(
            "Sample {}/{}: {} scores",
            i + 1,
            config.sample_count,
            distribution.len()
        );
        samples.push(distribution);

        // No delay after the final sample
        if i + 1 < config.sample_count {
            tokio::time::sleep(config.sample_interval).await;
        }
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Label;
    use crate::frame::ImageSample;

    struct ConstantSource {
        captures: usize,
        fail_after: Option<usize>,
    }

    impl ConstantSource {
        fn new() -> Self {
            Self {
                captures: 0,
                fail_after: None,
            }
        }

        fn failing_after(n: usize) -> Self {
            Self {
                captures: 0,
                fail_after: Some(n),
            }
        }
    }

    impl FrameSource for ConstantSource {
        fn capture(&mut self) -> Result<ImageSample, CaptureError> {
            if let Some(limit) = self.fail_after {
                if self.captures >= limit {
                    return Err(CaptureError::SourceUnavailable("camera stopped".to_string()));
                }
            }
            self.captures += 1;
            ImageSample::from_pixels(vec![0.5; ImageSample::PIXEL_COUNT])
        }
    }

    struct FixedClassifier {
        calls: usize,
    }

    impl Classifier for FixedClassifier {
        fn predict(&mut self, _sample: &ImageSample) -> Result<Distribution, ClassifyError> {
            self.calls += 1;
            let mut scores = vec![0.05; Label::COUNT];
            scores[Label::Happy.index()] = 0.7;
            Ok(Distribution::new(scores))
        }

        fn is_ready(&self) -> bool {
            true
        }
    }

    fn zero_delay(count: usize) -> SamplerConfig {
        SamplerConfig::from_ms(count, 0)
    }

    #[tokio::test]
    async fn test_collects_requested_count() {
        let mut source = ConstantSource::new();
        let mut classifier = FixedClassifier { calls: 0 };
        let stop = Arc::new(AtomicBool::new(false));

        let samples = collect_samples(&mut source, &mut classifier, &zero_delay(3), stop)
            .await
            .unwrap();

        assert_eq!(samples.len(), 3);
        assert_eq!(classifier.calls, 3);
    }

    #[tokio::test]
    async fn test_pre_set_stop_flag_yields_empty_prefix() {
        let mut source = ConstantSource::new();
        let mut classifier = FixedClassifier { calls: 0 };
        let stop = Arc::new(AtomicBool::new(true));

        let samples = collect_samples(&mut source, &mut classifier, &zero_delay(5), stop)
            .await
            .unwrap();

        assert!(samples.is_empty());
        assert_eq!(classifier.calls, 0);
    }

    /// Sets the stop flag after a fixed number of captures, like a user
    /// hitting Ctrl+C partway through a burst.
    struct SelfStoppingSource {
        captures: usize,
        stop_after: usize,
        stop_flag: Arc<AtomicBool>,
    }

    impl FrameSource for SelfStoppingSource {
        fn capture(&mut self) -> Result<ImageSample, CaptureError> {
            self.captures += 1;
            if self.captures >= self.stop_after {
                self.stop_flag.store(true, Ordering::SeqCst);
            }
            ImageSample::from_pixels(vec![0.5; ImageSample::PIXEL_COUNT])
        }
    }

    #[tokio::test]
    async fn test_midloop_cancellation_returns_partial_prefix() {
        use crate::analysis::{aggregate, Strategy, ThresholdConfig};

        let stop = Arc::new(AtomicBool::new(false));
        let mut source = SelfStoppingSource {
            captures: 0,
            stop_after: 2,
            stop_flag: stop.clone(),
        };
        let mut classifier = FixedClassifier { calls: 0 };

        let samples = collect_samples(&mut source, &mut classifier, &zero_delay(5), stop)
            .await
            .unwrap();

        // Cancellation after the second capture keeps the collected prefix
        assert_eq!(samples.len(), 2);
        assert_eq!(classifier.calls, 2);

        // A partial prefix is still a valid aggregator input
        let result = aggregate(&samples, Strategy::Average, &ThresholdConfig::default()).unwrap();
        assert_eq!(result.label, Label::Happy);
    }

    struct NotReadyClassifier;

    impl Classifier for NotReadyClassifier {
        fn predict(&mut self, _sample: &ImageSample) -> Result<Distribution, ClassifyError> {
            Err(ClassifyError::ModelNotReady)
        }

        fn is_ready(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_not_ready_classifier_refused() {
        let mut source = ConstantSource::new();
        let mut classifier = NotReadyClassifier;
        let stop = Arc::new(AtomicBool::new(false));

        let result = collect_samples(&mut source, &mut classifier, &zero_delay(3), stop).await;

        assert!(matches!(
            result,
            Err(SampleError::Classify(ClassifyError::ModelNotReady))
        ));
        assert_eq!(source.captures, 0);
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let mut source = ConstantSource::failing_after(2);
        let mut classifier = FixedClassifier { calls: 0 };
        let stop = Arc::new(AtomicBool::new(false));

        let result = collect_samples(&mut source, &mut classifier, &zero_delay(5), stop).await;

        assert!(matches!(
            result,
            Err(SampleError::Capture(CaptureError::SourceUnavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_prefix_feeds_aggregator() {
        use crate::analysis::{aggregate, Strategy, ThresholdConfig, Tier};

        let mut source = ConstantSource::new();
        let mut classifier = FixedClassifier { calls: 0 };
        let stop = Arc::new(AtomicBool::new(false));

        let samples = collect_samples(&mut source, &mut classifier, &zero_delay(4), stop)
            .await
            .unwrap();
        let result = aggregate(&samples, Strategy::Average, &ThresholdConfig::default()).unwrap();

        assert_eq!(result.label, Label::Happy);
        assert_eq!(result.tier, Tier::High);
    }
}
