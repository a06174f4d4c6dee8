//! Error types for persona-body

use persona_core::Error as CoreError;
use thiserror::Error;

/// Body animation errors
#[derive(Error, Debug)]
pub enum BodyError {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<BodyError> for CoreError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::Load(msg) => CoreError::Load(msg),
            BodyError::Config(msg) => CoreError::Config(msg),
            BodyError::Core(core) => core,
        }
    }
}
