//! Facial expression presets, emotions and the sink they are written to

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Facial expression channels exposed by the character model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpressionPreset {
    /// Open "a" mouth shape
    Aa,
    /// Wide "e" mouth shape
    Ee,
    /// Narrow "i" mouth shape
    Ih,
    /// Rounded "o" mouth shape
    Oh,
    /// Pursed "u" mouth shape
    Ou,
    /// Resting face
    Neutral,
    Happy,
    Angry,
    Sad,
    Relaxed,
    Surprised,
    Blink,
    BlinkLeft,
    BlinkRight,
    LookUp,
    LookDown,
    LookLeft,
    LookRight,
}

impl ExpressionPreset {
    /// Every preset the character model exposes
    pub const ALL: [ExpressionPreset; 18] = [
        ExpressionPreset::Aa,
        ExpressionPreset::Ee,
        ExpressionPreset::Ih,
        ExpressionPreset::Oh,
        ExpressionPreset::Ou,
        ExpressionPreset::Neutral,
        ExpressionPreset::Happy,
        ExpressionPreset::Angry,
        ExpressionPreset::Sad,
        ExpressionPreset::Relaxed,
        ExpressionPreset::Surprised,
        ExpressionPreset::Blink,
        ExpressionPreset::BlinkLeft,
        ExpressionPreset::BlinkRight,
        ExpressionPreset::LookUp,
        ExpressionPreset::LookDown,
        ExpressionPreset::LookLeft,
        ExpressionPreset::LookRight,
    ];

    /// Closed set of mouth shapes driven by lip sync: five vowels plus neutral
    pub const MOUTH: [ExpressionPreset; 6] = [
        ExpressionPreset::Aa,
        ExpressionPreset::Ee,
        ExpressionPreset::Ih,
        ExpressionPreset::Oh,
        ExpressionPreset::Ou,
        ExpressionPreset::Neutral,
    ];

    /// Emotion channels that compete with each other for the base expression
    pub const EMOTIONS: [ExpressionPreset; 4] = [
        ExpressionPreset::Happy,
        ExpressionPreset::Angry,
        ExpressionPreset::Sad,
        ExpressionPreset::Surprised,
    ];

    /// Channel name as the character model knows it
    pub fn name(&self) -> &'static str {
        match self {
            ExpressionPreset::Aa => "aa",
            ExpressionPreset::Ee => "ee",
            ExpressionPreset::Ih => "ih",
            ExpressionPreset::Oh => "oh",
            ExpressionPreset::Ou => "ou",
            ExpressionPreset::Neutral => "neutral",
            ExpressionPreset::Happy => "happy",
            ExpressionPreset::Angry => "angry",
            ExpressionPreset::Sad => "sad",
            ExpressionPreset::Relaxed => "relaxed",
            ExpressionPreset::Surprised => "surprised",
            ExpressionPreset::Blink => "blink",
            ExpressionPreset::BlinkLeft => "blinkLeft",
            ExpressionPreset::BlinkRight => "blinkRight",
            ExpressionPreset::LookUp => "lookUp",
            ExpressionPreset::LookDown => "lookDown",
            ExpressionPreset::LookLeft => "lookLeft",
            ExpressionPreset::LookRight => "lookRight",
        }
    }

    pub fn is_mouth(&self) -> bool {
        Self::MOUTH.contains(self)
    }

    /// Weight of this preset in the rest pose
    pub fn rest_weight(&self) -> f32 {
        if *self == ExpressionPreset::Neutral {
            1.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for ExpressionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One weighted contribution to a blended mouth shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpressionWeight {
    pub expression: ExpressionPreset,
    /// Relative weight within the blend (0.0-1.0)
    pub weight: f32,
}

impl ExpressionWeight {
    pub const fn new(expression: ExpressionPreset, weight: f32) -> Self {
        Self { expression, weight }
    }
}

/// The character's blendshape interface
///
/// Writes are synchronous and side-effect only. The body animator never
/// touches it; only the lip-sync side writes facial weights.
pub trait ExpressionSink: Send + Sync {
    fn set_value(&self, expression: ExpressionPreset, weight: f32);
}

/// Emotion attached to a line of dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Happy,
    #[default]
    Neutral,
    Funny,
}

impl Emotion {
    pub const ALL: [Emotion; 4] = [Emotion::Angry, Emotion::Happy, Emotion::Neutral, Emotion::Funny];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Happy => "happy",
            Emotion::Neutral => "neutral",
            Emotion::Funny => "funny",
        }
    }

    /// Expression layered under lip sync for this emotion
    ///
    /// Neutral has no override; funny reads as happy on the face.
    pub fn base_expression(&self) -> Option<ExpressionPreset> {
        match self {
            Emotion::Happy | Emotion::Funny => Some(ExpressionPreset::Happy),
            Emotion::Angry => Some(ExpressionPreset::Angry),
            Emotion::Neutral => None,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = std::convert::Infallible;

    /// Unknown labels fall back to neutral
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "angry" => Emotion::Angry,
            "happy" => Emotion::Happy,
            "funny" => Emotion::Funny,
            _ => Emotion::Neutral,
        })
    }
}

impl<'de> Deserialize<'de> for Emotion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(label.parse().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_pose_weights() {
        for preset in ExpressionPreset::ALL {
            let expected = if preset == ExpressionPreset::Neutral { 1.0 } else { 0.0 };
            assert_eq!(preset.rest_weight(), expected);
        }
    }

    #[test]
    fn test_mouth_set_is_closed() {
        assert!(ExpressionPreset::Neutral.is_mouth());
        assert!(ExpressionPreset::Ou.is_mouth());
        assert!(!ExpressionPreset::Happy.is_mouth());
        assert!(!ExpressionPreset::Blink.is_mouth());
    }

    #[test]
    fn test_emotion_parsing_falls_back_to_neutral() {
        assert_eq!("ANGRY".parse::<Emotion>().unwrap(), Emotion::Angry);
        assert_eq!(" funny ".parse::<Emotion>().unwrap(), Emotion::Funny);
        assert_eq!("melancholic".parse::<Emotion>().unwrap(), Emotion::Neutral);

        let parsed: Emotion = serde_json::from_str("\"sarcastic\"").unwrap();
        assert_eq!(parsed, Emotion::Neutral);
    }

    #[test]
    fn test_funny_reads_as_happy() {
        assert_eq!(Emotion::Funny.base_expression(), Some(ExpressionPreset::Happy));
        assert_eq!(Emotion::Neutral.base_expression(), None);
    }
}
