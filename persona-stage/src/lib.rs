//! persona-stage: puts the character on stage
//!
//! Composes body animation, lip sync and dialogue into one performer:
//! - Layered configuration from JSON or TOML files and the environment
//! - Structured answer-with-emotion dialogue with retry on outages
//! - Performing a line: talking body, lip-synced speech, return to idle
//! - Tracing subscriber setup for binaries

pub mod error;
pub mod config;
pub mod dialogue;
pub mod performer;
pub mod telemetry;

pub use error::{DialogueError, StageError};
pub use config::{DialogueConfig, PersonaConfig};
pub use dialogue::{
    emotion_guidance, generate_answer_with_emotion, generate_with_retry, AnswerWithEmotion,
    DialogueSource, RetryPolicy,
};
pub use performer::Performer;
pub use telemetry::init_tracing;
