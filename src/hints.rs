//! User-facing hint lines shown next to a result.

use rand::seq::SliceRandom;

use crate::classify::Label;

/// Shown instead of a label when the confidence tier is Low.
pub const LOW_CONFIDENCE_MESSAGE: &str = "No clear face detected";

/// Guidance paired with the low-confidence message.
pub const LOW_CONFIDENCE_HINT: &str =
    "Improve lighting or bring your face closer for better accuracy.";

/// Hint/fact lines per emotion.
fn hints_for(label: Label) -> &'static [&'static str] {
    match label {
        Label::Angry => &[
            "Slow breathing lowers heart rate within about a minute.",
            "A short walk is one of the fastest ways to cool down.",
        ],
        Label::Disgust => &[
            "Disgust is the fastest-forming facial expression.",
            "It shares facial muscles with the reaction to bitter taste.",
        ],
        Label::Fear => &[
            "Fear sharpens peripheral vision and reaction time.",
            "Naming a worry out loud measurably reduces its intensity.",
        ],
        Label::Happy => &[
            "Smiling, even on purpose, can lift your mood.",
            "Genuine smiles engage the muscles around the eyes.",
        ],
        Label::Sad => &[
            "Sadness slows thinking down, which helps with reflection.",
            "Listening to music is a common and effective mood shifter.",
        ],
        Label::Surprise => &[
            "Surprise is the shortest-lived emotion, under a second.",
            "Raised eyebrows widen the field of view momentarily.",
        ],
        Label::Neutral => &[
            "A neutral face still leaks micro-expressions.",
            "Most of the day is spent in a neutral emotional state.",
        ],
    }
}

/// Pick one hint line for the label.
pub fn random_hint(label: Label) -> &'static str {
    let hints = hints_for(label);
    hints
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(hints[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ALL_LABELS;

    #[test]
    fn test_every_label_has_hints() {
        for label in ALL_LABELS {
            assert!(!hints_for(label).is_empty());
        }
    }

    #[test]
    fn test_random_hint_belongs_to_label() {
        for label in ALL_LABELS {
            let hint = random_hint(label);
            assert!(hints_for(label).contains(&hint));
        }
    }
}
