//! Emotion aggregator.
//!
//! Turns a short sequence of raw per-frame classifier outputs into one
//! reported result with a confidence tier. Pure function of its inputs:
//! sampling (and its delays) lives in the driver, history lives with the
//! caller, so this module is testable without a camera or a model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::{Distribution, Label};

/// Errors from the aggregation step
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Malformed sample set. Fatal to the call; a bad sample must never be
    /// silently mapped to label index 0.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// How repeated classifier outputs collapse into one result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Arg-max of the most recent sample only
    Single,
    /// Arg-max of the element-wise mean across samples
    Average,
    /// Most frequent per-sample arg-max label
    MajorityVote,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Average
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "average" => Ok(Self::Average),
            "majority" | "majorityvote" => Ok(Self::MajorityVote),
            _ => Err(format!("Unknown strategy: {} (single|average|majority)", s)),
        }
    }
}

/// Coarse confidence bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    High,
}

/// Which comparator decides the Low tier.
///
/// The duplicated originals disagree on `<` vs `<=`; both are explicit
/// configuration here rather than a guessed single behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdRule {
    /// `score < threshold` is Low
    Strict,
    /// `score <= threshold` is Low
    Inclusive,
}

/// Confidence tier configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub threshold: f32,
    pub rule: ThresholdRule,
}

/// Default confidence threshold (observed range in the wild is 0.4-0.6).
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            rule: ThresholdRule::Strict,
        }
    }
}

impl ThresholdConfig {
    pub fn tier_for(&self, score: f32) -> Tier {
        let low = match self.rule {
            ThresholdRule::Strict => score < self.threshold,
            ThresholdRule::Inclusive => score <= self.threshold,
        };
        if low {
            Tier::Low
        } else {
            Tier::High
        }
    }
}

/// One reported analysis result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub label: Label,
    /// In [0, 1], derived from the aggregated scores at the winning index
    pub score: f32,
    pub tier: Tier,
}

/// Collapse raw per-frame distributions into one result.
///
/// Every distribution must have exactly `Label::COUNT` scores and the
/// sequence must be non-empty; anything else is `InvalidInput`. All arg-max
/// ties resolve to the lowest label index. `Single` uses the most recent
/// (last) sample when more than one is supplied.
pub fn aggregate(
    samples: &[Distribution],
    strategy: Strategy,
    thresholds: &ThresholdConfig,
) -> Result<AggregateResult, AggregateError> {
    let Some(freshest) = samples.last() else {
        return Err(AggregateError::InvalidInput(
            "Empty sample sequence".to_string(),
        ));
    };

    for (i, sample) in samples.iter().enumerate() {
        if sample.len() != Label::COUNT {
            return Err(AggregateError::InvalidInput(format!(
                "Sample {} has {} scores (expected {})",
                i,
                sample.len(),
                Label::COUNT
            )));
        }
    }

    let (index, raw_score) = match strategy {
        Strategy::Single => arg_max_of(freshest)?,
        Strategy::Average => arg_max_of(&mean_distribution(samples))?,
        Strategy::MajorityVote => majority_vote(samples)?,
    };

    let label = Label::from_index(index).ok_or_else(|| {
        AggregateError::InvalidInput(format!("Winning index {} outside label set", index))
    })?;
    let score = raw_score.clamp(0.0, 1.0);

    Ok(AggregateResult {
        label,
        score,
        tier: thresholds.tier_for(score),
    })
}

fn arg_max_of(dist: &Distribution) -> Result<(usize, f32), AggregateError> {
    dist.arg_max()
        .ok_or_else(|| AggregateError::InvalidInput("Empty distribution".to_string()))
}

/// Element-wise mean across samples. Lengths are validated by the caller.
fn mean_distribution(samples: &[Distribution]) -> Distribution {
    let mut sums = vec![0.0f32; Label::COUNT];
    for sample in samples {
        for (sum, &score) in sums.iter_mut().zip(sample.scores.iter()) {
            *sum += score;
        }
    }
    let n = samples.len() as f32;
    Distribution::new(sums.into_iter().map(|s| s / n).collect())
}

/// Most frequent per-sample arg-max label; ties resolve to the lowest
/// index. The reported score is the mean of the winning label's raw
/// per-sample scores so it stays comparable to `Average`.
fn majority_vote(samples: &[Distribution]) -> Result<(usize, f32), AggregateError> {
    let mut votes = [0usize; Label::COUNT];
    for sample in samples {
        let (index, _) = arg_max_of(sample)?;
        votes[index] += 1;
    }

    let mut winner = 0;
    for (index, &count) in votes.iter().enumerate() {
        if count > votes[winner] {
            winner = index;
        }
    }

    let mean_score =
        samples.iter().map(|s| s.scores[winner]).sum::<f32>() / samples.len() as f32;
    Ok((winner, mean_score))
}
