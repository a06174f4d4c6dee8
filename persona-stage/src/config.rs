//! Performer configuration: files, environment overrides and validation

use crate::dialogue::RetryPolicy;
use crate::error::StageError;
use persona_core::{AnimationPaths, BodyConfig, LipSyncConfig, LipSyncPreset};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Dialogue generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Character instruction given to the dialogue service
    pub system_prompt: String,

    /// Attempts before giving up on an unavailable service (default 10)
    pub max_attempts: u32,

    /// Base of the exponential backoff in milliseconds (default 5000)
    pub backoff_base_ms: u64,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a friendly virtual character. Keep answers short enough to say out loud."
                .to_string(),
            max_attempts: 10,
            backoff_base_ms: 5_000,
        }
    }
}

impl DialogueConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.backoff_base_ms),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("Dialogue max_attempts must be at least 1".to_string());
        }
        if self.max_attempts > 20 {
            return Err("Dialogue max_attempts must be at most 20".to_string());
        }
        Ok(())
    }
}

/// Everything a performer needs, loadable from one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// Tracing filter directive, e.g. "info" or "persona_body=debug"
    pub log_level: String,
    pub body: BodyConfig,
    pub lip_sync: LipSyncConfig,
    pub animations: AnimationPaths,
    pub dialogue: DialogueConfig,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            body: BodyConfig::default(),
            lip_sync: LipSyncConfig::default(),
            animations: AnimationPaths::default(),
            dialogue: DialogueConfig::default(),
        }
    }
}

impl PersonaConfig {
    /// Load configuration from a JSON or TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StageError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_str(&content)
    }

    /// Parse configuration, trying JSON first and then TOML
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, StageError> {
        if let Ok(config) = serde_json::from_str::<PersonaConfig>(content) {
            return Ok(config);
        }

        toml::from_str::<PersonaConfig>(content)
            .map_err(|e| StageError::Config(format!("Configuration is neither valid JSON nor TOML: {}", e)))
    }

    /// Apply `PERSONA_*` environment overrides
    pub fn apply_env(&mut self) -> Result<(), StageError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    ///
    /// A preset replaces the whole lip-sync section; an explicit intensity
    /// is applied on top of it.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), StageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("PERSONA_LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(preset) = lookup("PERSONA_LIPSYNC_PRESET") {
            let preset: LipSyncPreset = preset.parse().map_err(StageError::Config)?;
            self.lip_sync = LipSyncConfig::preset(preset);
        }

        if let Some(intensity) = lookup("PERSONA_LIPSYNC_INTENSITY") {
            self.lip_sync.intensity = intensity.trim().parse().map_err(|_| {
                StageError::Config(format!("PERSONA_LIPSYNC_INTENSITY is not a number: '{}'", intensity))
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), StageError> {
        tracing_subscriber::EnvFilter::try_new(&self.log_level)
            .map_err(|e| StageError::Config(format!("Invalid log level '{}': {}", self.log_level, e)))?;
        self.body.validate().map_err(StageError::Config)?;
        self.lip_sync.validate().map_err(StageError::Config)?;
        self.animations.validate().map_err(StageError::Config)?;
        self.dialogue.validate().map_err(StageError::Config)?;
        Ok(())
    }
}
