use serde::{Deserialize, Serialize};

/// Emotion classes the model can output.
///
/// The variant order matches the model's output vector position-for-position.
/// This is an invariant, not a convention: changing the model means changing
/// this enum consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

/// All labels in model output order.
pub const ALL_LABELS: [Label; 7] = [
    Label::Angry,
    Label::Disgust,
    Label::Fear,
    Label::Happy,
    Label::Sad,
    Label::Surprise,
    Label::Neutral,
];

impl Label {
    /// Number of emotion classes (length of the model output vector).
    pub const COUNT: usize = ALL_LABELS.len();

    /// Look up a label by its output vector index.
    pub fn from_index(index: usize) -> Option<Label> {
        ALL_LABELS.get(index).copied()
    }

    /// Position of this label in the model output vector.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Angry => "Angry",
            Self::Disgust => "Disgust",
            Self::Fear => "Fear",
            Self::Happy => "Happy",
            Self::Sad => "Sad",
            Self::Surprise => "Surprise",
            Self::Neutral => "Neutral",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Angry => "😠",
            Self::Disgust => "🤢",
            Self::Fear => "😨",
            Self::Happy => "😊",
            Self::Sad => "😢",
            Self::Surprise => "😲",
            Self::Neutral => "😐",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "angry" => Ok(Self::Angry),
            "disgust" => Ok(Self::Disgust),
            "fear" => Ok(Self::Fear),
            "happy" => Ok(Self::Happy),
            "sad" => Ok(Self::Sad),
            "surprise" => Ok(Self::Surprise),
            "neutral" => Ok(Self::Neutral),
            _ => Err(format!("Unknown emotion label: {}", s)),
        }
    }
}

/// Per-label score vector from one classifier call.
///
/// Scores are non-negative comparable magnitudes; no sum-to-1 invariant is
/// assumed. Length is validated against `Label::COUNT` by the aggregator
/// before any index is trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub scores: Vec<f32>,
}

impl Distribution {
    pub fn new(scores: Vec<f32>) -> Self {
        Self { scores }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Index and score of the maximal entry. Ties resolve to the lowest
    /// index (first max found). `None` on an empty vector.
    pub fn arg_max(&self) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &score) in self.scores.iter().enumerate() {
            match best {
                Some((_, b)) if score <= b => {}
                _ => best = Some((i, score)),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_order_matches_indices() {
        assert_eq!(Label::COUNT, 7);
        for (i, label) in ALL_LABELS.iter().enumerate() {
            assert_eq!(label.index(), i);
            assert_eq!(Label::from_index(i), Some(*label));
        }
        assert_eq!(Label::from_index(7), None);
    }

    #[test]
    fn test_label_parse() {
        assert_eq!("happy".parse::<Label>().unwrap(), Label::Happy);
        assert_eq!("SURPRISE".parse::<Label>().unwrap(), Label::Surprise);
        assert!("joy".parse::<Label>().is_err());
    }

    #[test]
    fn test_arg_max_picks_largest() {
        let dist = Distribution::new(vec![0.1, 0.2, 0.05, 0.6, 0.02, 0.02, 0.01]);
        assert_eq!(dist.arg_max(), Some((3, 0.6)));
    }

    #[test]
    fn test_arg_max_tie_resolves_to_lowest_index() {
        let dist = Distribution::new(vec![0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(dist.arg_max(), Some((0, 0.5)));
    }

    #[test]
    fn test_arg_max_empty() {
        let dist = Distribution::new(vec![]);
        assert_eq!(dist.arg_max(), None);
    }
}
