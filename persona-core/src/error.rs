//! Error types for persona-core

use thiserror::Error;

/// Errors shared by every persona crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Load error: {0}")]
    Load(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
