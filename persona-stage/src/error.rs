//! Error types for persona-stage

use persona_body::BodyError;
use persona_core::Error as CoreError;
use persona_lips::LipSyncError;
use thiserror::Error;

/// Dialogue generation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DialogueError {
    /// Transient outage; the only error that is retried
    #[error("Dialogue service unavailable: {0}")]
    Unavailable(String),

    #[error("Dialogue provider error: {0}")]
    Provider(String),

    #[error("Could not parse dialogue answer: {0}")]
    Parse(String),

    #[error("Dialogue service still unavailable after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

/// Errors raised while configuring or running a performer
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dialogue error: {0}")]
    Dialogue(#[from] DialogueError),

    #[error("Body animation error: {0}")]
    Body(#[from] BodyError),

    #[error("Lip sync error: {0}")]
    LipSync(#[from] LipSyncError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<StageError> for CoreError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::Config(msg) => CoreError::Config(msg),
            StageError::Io(e) => CoreError::Io(e),
            StageError::Dialogue(e) => CoreError::Load(e.to_string()),
            StageError::Body(e) => e.into(),
            StageError::LipSync(e) => e.into(),
            StageError::Core(core) => core,
        }
    }
}
