//! Analysis pipeline: the sampling driver and the pure aggregator it feeds.

mod aggregate;
mod sampler;

pub use aggregate::{
    aggregate, AggregateError, AggregateResult, Strategy, ThresholdConfig, ThresholdRule, Tier,
    DEFAULT_CONFIDENCE_THRESHOLD,
};
pub use sampler::{collect_samples, SampleError, SamplerConfig};
