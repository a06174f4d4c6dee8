//! Error types for persona-lips

use persona_core::Error as CoreError;
use thiserror::Error;

/// Lip-sync errors
#[derive(Error, Debug)]
pub enum LipSyncError {
    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Utterance was dropped before completing")]
    Abandoned,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<LipSyncError> for CoreError {
    fn from(err: LipSyncError) -> Self {
        match err {
            LipSyncError::Speech(msg) | LipSyncError::Decode(msg) => CoreError::Load(msg),
            LipSyncError::Playback(msg) => CoreError::Playback(msg),
            LipSyncError::Config(msg) => CoreError::Config(msg),
            LipSyncError::Serialization(e) => CoreError::Serialization(e),
            LipSyncError::Core(core) => core,
            other => CoreError::Playback(other.to_string()),
        }
    }
}
