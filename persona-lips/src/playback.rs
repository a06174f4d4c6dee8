//! Audio output interface

use crate::error::LipSyncError;
use crate::speech::AudioBuffer;

/// Plays utterance audio
///
/// Lip sync is scheduled from the moment `start` returns, not from
/// playback progress reported by the device.
pub trait AudioPlayback: Send + Sync {
    fn start(&self, buffer: &AudioBuffer) -> Result<(), LipSyncError>;

    /// Cut the current audio short
    fn stop(&self) {}

    /// Called once the utterance has finished and the face is back at rest
    fn finished(&self) {}
}
