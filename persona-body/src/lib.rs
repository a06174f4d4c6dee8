//! persona-body: full-body animation state machine
//!
//! Selects, crossfades and debounces motion clips for a character:
//! - Idle and talking states with emotion-specific talking clips
//! - Debounced return to idle after speech stops
//! - Duplicate-aware clip transitions with a timed crossfade
//! - Graceful degradation to a static pose when a clip fails to load

pub mod error;
pub mod clip;
pub mod mixer;
pub mod slots;
pub mod animator;

pub use error::BodyError;
pub use clip::{ClipId, ClipSource, RetargetedClip, Track, TrackKind};
pub use mixer::{ActionId, LoopMode, PlaybackAction, PlaybackStatus, PoseMixer};
pub use slots::{ActionSlots, FadingAction};
pub use animator::{AnimationState, BodyAnimator};
