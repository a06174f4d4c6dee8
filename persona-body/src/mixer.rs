//! Pose mixer interface and playback actions

use crate::clip::{ClipId, RetargetedClip};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an action living in the mixer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action#{}", self.0)
    }
}

/// How an action behaves at the end of its clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// Play once and hold the last frame
    Once,
    /// Repeat forever
    Repeat,
}

impl LoopMode {
    pub fn from_looping(looping: bool) -> Self {
        if looping {
            LoopMode::Repeat
        } else {
            LoopMode::Once
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    Playing,
    Stopped,
}

/// One clip mixed into the skeleton, as tracked by the state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackAction {
    pub id: ActionId,
    pub clip: ClipId,
    pub clip_name: String,
    pub loop_mode: LoopMode,
    pub status: PlaybackStatus,
}

impl PlaybackAction {
    pub fn new(id: ActionId, clip: &RetargetedClip, loop_mode: LoopMode) -> Self {
        Self {
            id,
            clip: clip.id,
            clip_name: clip.name.clone(),
            loop_mode,
            status: PlaybackStatus::Stopped,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}

/// The character's skeletal animation mixer
///
/// Treated as opaque: the state machine only decides which actions play and
/// how they hand over, never touches bone transforms. Implementations use
/// interior mutability; calls are made from the animation thread.
pub trait PoseMixer: Send + Sync {
    /// The mixer's action for `clip`, created on first use
    fn clip_action(&self, clip: &RetargetedClip) -> ActionId;

    fn set_loop(&self, action: ActionId, mode: LoopMode);

    /// Rewind to frame zero with full weight
    fn reset(&self, action: ActionId);

    fn play(&self, action: ActionId);

    fn stop(&self, action: ActionId);

    fn is_running(&self, action: ActionId) -> bool;

    /// Blend weight linearly from `from` to `to` over `duration_secs`
    fn crossfade(&self, from: ActionId, to: ActionId, duration_secs: f32);

    /// Forget a stopped action so its resources can be reclaimed
    fn uncache(&self, action: ActionId);

    /// Advance every active action by `delta_secs`
    fn advance(&self, delta_secs: f32);
}
