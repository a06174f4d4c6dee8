//! persona-lips: phoneme-timed facial animation
//!
//! Drives mouth-shape blendshapes in step with synthesized speech:
//! - Phoneme to weighted mouth-shape table
//! - Normalised expression blending that always sums to a full face
//! - Per-utterance scheduling against the audio start, with stop/reset
//! - Decoding of speech payloads (base64 audio + character alignment)

pub mod error;
pub mod visemes;
pub mod blend;
pub mod speech;
pub mod playback;
pub mod scheduler;

pub use error::LipSyncError;
pub use visemes::expression_weights;
pub use blend::LipSyncAnimator;
pub use speech::{Alignment, AudioBuffer, AudioDecoder, PayloadSpeechSource, SpeechClip, SpeechPayload, SpeechSource, SpeechTransport, WavDecoder};
pub use playback::AudioPlayback;
pub use scheduler::{Cue, LipSyncScheduler, Utterance, REST_PADDING_SECS};
