//! Motion clips and the source that loads them

use crate::error::BodyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of a loaded clip
///
/// Two loads may hand back the same clip (the source caches it) or two
/// distinct clips for the same path; the id tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId(pub u64);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// What a track animates on its joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Rotation,
    Position,
}

/// Keyframes for one joint property, already named after the character's skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Target joint, e.g. "hips.quaternion"
    pub name: String,
    pub kind: TrackKind,
    /// Keyframe times in seconds
    pub times: Vec<f32>,
    /// Flattened keyframe values (4 per key for rotations, 3 for positions)
    pub values: Vec<f32>,
}

/// A clip remapped onto the character's skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetargetedClip {
    pub id: ClipId,
    pub name: String,
    /// Length in seconds
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl RetargetedClip {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Loads and retargets clips
#[async_trait]
pub trait ClipSource: Send + Sync {
    /// Load the clip behind a path or id
    ///
    /// Fails with `BodyError::Load` when the asset cannot be fetched or
    /// remapped onto the skeleton.
    async fn load(&self, path: &str) -> Result<Arc<RetargetedClip>, BodyError>;
}
