//! persona-core: shared model for the character animation engine
//!
//! Provides the pieces both animation subsystems agree on:
//! - Emotions, expression presets and the expression sink interface
//! - Phoneme timings and weighted mouth shapes
//! - Clip catalogues, body timing and lip-sync configuration
//! - Cancellable scheduled tasks and injectable random clip selection

pub mod error;
pub mod config;
pub mod expression;
pub mod phoneme;
pub mod random;
pub mod timer;

pub use error::{Error, Result};
pub use config::{AnimationPaths, BodyConfig, LipSyncConfig, LipSyncOverrides, LipSyncPreset};
pub use expression::{Emotion, ExpressionPreset, ExpressionSink, ExpressionWeight};
pub use phoneme::PhonemeTiming;
pub use random::{pick_random, RandomSource};
pub use timer::ScheduledTask;
