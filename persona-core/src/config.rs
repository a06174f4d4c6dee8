//! Configuration for body animation and lip sync

use crate::expression::Emotion;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Clip references grouped by the behaviour they animate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationPaths {
    pub idle: Vec<String>,
    pub neutral: Vec<String>,
    pub happy: Vec<String>,
    pub angry: Vec<String>,
    pub funny: Vec<String>,
}

impl AnimationPaths {
    /// Talking clips for an emotion
    pub fn for_emotion(&self, emotion: Emotion) -> &[String] {
        match emotion {
            Emotion::Angry => &self.angry,
            Emotion::Happy => &self.happy,
            Emotion::Funny => &self.funny,
            Emotion::Neutral => &self.neutral,
        }
    }

    pub fn len(&self) -> usize {
        self.idle.len() + self.neutral.len() + self.happy.len() + self.angry.len() + self.funny.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate clip references
    pub fn validate(&self) -> Result<(), String> {
        let categories = [
            ("idle", &self.idle),
            ("neutral", &self.neutral),
            ("happy", &self.happy),
            ("angry", &self.angry),
            ("funny", &self.funny),
        ];
        for (category, paths) in categories {
            for path in paths.iter() {
                if path.trim().is_empty() {
                    return Err(format!("Empty clip reference in '{}' animations", category));
                }
                if path.chars().any(|c| c == '\0' || c.is_control()) {
                    return Err(format!("Clip reference in '{}' contains invalid characters", category));
                }
            }
        }
        Ok(())
    }
}

/// Timing of the body animation state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Delay before a stop-talking request returns the body to idle (default 200)
    pub idle_debounce_ms: u64,

    /// Crossfade window between two different clips, in seconds (default 0.3)
    pub crossfade_secs: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            idle_debounce_ms: 200,
            crossfade_secs: 0.3,
        }
    }
}

impl BodyConfig {
    pub fn idle_debounce(&self) -> Duration {
        Duration::from_millis(self.idle_debounce_ms)
    }

    /// Crossfade window rounded to whole milliseconds
    pub fn crossfade(&self) -> Duration {
        Duration::from_millis((self.crossfade_secs.max(0.0) * 1000.0).round() as u64)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.idle_debounce_ms > 10_000 {
            return Err("Idle debounce must be at most 10000 ms".to_string());
        }
        if !self.crossfade_secs.is_finite() || !(0.0..=5.0).contains(&self.crossfade_secs) {
            return Err("Crossfade must be between 0.0 and 5.0 seconds".to_string());
        }
        Ok(())
    }
}

/// Lip-sync settings for one utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LipSyncConfig {
    /// Multiplier applied after weight normalisation (0.5-2.0, default 1.0)
    pub intensity: f32,

    /// Smoothing factor (0.0-1.0, default 0.3)
    pub smoothing: f32,

    /// Log per-utterance progress
    pub debug_logging: bool,
}

impl Default for LipSyncConfig {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            smoothing: 0.3,
            debug_logging: true,
        }
    }
}

/// Partial lip-sync settings merged over the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LipSyncOverrides {
    pub intensity: Option<f32>,
    pub smoothing: Option<f32>,
    pub debug_logging: Option<bool>,
}

/// Named lip-sync tunings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LipSyncPreset {
    Natural,
    Expressive,
    Subtle,
}

impl FromStr for LipSyncPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "natural" => Ok(LipSyncPreset::Natural),
            "expressive" => Ok(LipSyncPreset::Expressive),
            "subtle" => Ok(LipSyncPreset::Subtle),
            other => Err(format!("Unknown lip-sync preset '{}'", other)),
        }
    }
}

impl LipSyncConfig {
    pub fn preset(preset: LipSyncPreset) -> Self {
        match preset {
            LipSyncPreset::Natural => Self {
                intensity: 0.8,
                smoothing: 0.4,
                debug_logging: false,
            },
            LipSyncPreset::Expressive => Self {
                intensity: 1.2,
                smoothing: 0.2,
                debug_logging: false,
            },
            LipSyncPreset::Subtle => Self {
                intensity: 0.6,
                smoothing: 0.5,
                debug_logging: false,
            },
        }
    }

    /// Defaults with the given fields replaced
    pub fn with_overrides(overrides: LipSyncOverrides) -> Self {
        let mut config = Self::default();
        config.apply(&overrides);
        config
    }

    pub fn apply(&mut self, overrides: &LipSyncOverrides) {
        if let Some(intensity) = overrides.intensity {
            self.intensity = intensity;
        }
        if let Some(smoothing) = overrides.smoothing {
            self.smoothing = smoothing;
        }
        if let Some(debug_logging) = overrides.debug_logging {
            self.debug_logging = debug_logging;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.intensity.is_finite() || !(0.5..=2.0).contains(&self.intensity) {
            return Err("Lip-sync intensity must be between 0.5 and 2.0".to_string());
        }
        if !self.smoothing.is_finite() || !(0.0..=1.0).contains(&self.smoothing) {
            return Err("Lip-sync smoothing must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }
}
