//! Speech audio, phoneme timings and the sources that produce them

use crate::error::LipSyncError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use persona_core::PhonemeTiming;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decoded PCM audio, interleaved when multi-channel
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self, LipSyncError> {
        if sample_rate == 0 {
            return Err(LipSyncError::Decode("Sample rate cannot be 0".to_string()));
        }
        if channels == 0 {
            return Err(LipSyncError::Decode("Channel count cannot be 0".to_string()));
        }
        Ok(Self {
            samples: samples.into(),
            sample_rate,
            channels,
        })
    }

    /// Mono silence lasting `duration_secs`
    pub fn silence(duration_secs: f64, sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        let frames = (duration_secs.max(0.0) * sample_rate as f64).round() as usize;
        Self {
            samples: vec![0.0; frames].into(),
            sample_rate,
            channels: 1,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Audio and phoneme timings for one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechClip {
    pub audio: AudioBuffer,
    pub timings: Vec<PhonemeTiming>,
}

/// Turns text into speech audio plus phoneme timings
#[async_trait]
pub trait SpeechSource: Send + Sync {
    async fn fetch(&self, text: &str) -> Result<SpeechClip, LipSyncError>;
}

/// Delivers the raw JSON speech payload for a line of text
#[async_trait]
pub trait SpeechTransport: Send + Sync {
    async fn request(&self, text: &str) -> Result<String, LipSyncError>;
}

/// Decodes encoded audio bytes into PCM
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer, LipSyncError>;
}

/// Decoder for RIFF/WAVE audio
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer, LipSyncError> {
        let reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| LipSyncError::Decode(format!("Invalid WAV data: {}", e)))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| LipSyncError::Decode(format!("Corrupt WAV samples: {}", e)))?,
            hound::SampleFormat::Int => {
                let max_value = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|sample| sample.map(|s| s as f32 / max_value))
                    .collect::<Result<_, _>>()
                    .map_err(|e| LipSyncError::Decode(format!("Corrupt WAV samples: {}", e)))?
            }
        };

        AudioBuffer::new(samples, spec.sample_rate, spec.channels)
    }
}

/// Character-level alignment as returned by the speech provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alignment {
    pub characters: Vec<String>,
    pub character_start_times_seconds: Vec<f64>,
    pub character_end_times_seconds: Vec<f64>,
}

/// JSON body carrying base64 audio and per-character phoneme timings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,

    /// Older field name for the same audio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,

    #[serde(default)]
    pub phonemes: Value,
}

impl SpeechPayload {
    pub fn from_json(body: &str) -> Result<Self, LipSyncError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Build a payload from provider alignment; extra entries in longer lists are dropped
    pub fn from_alignment(audio_base64: impl Into<String>, alignment: &Alignment) -> Self {
        let phonemes: Vec<Value> = alignment
            .characters
            .iter()
            .zip(&alignment.character_start_times_seconds)
            .zip(&alignment.character_end_times_seconds)
            .map(|((character, start), end)| {
                json!({
                    "character": character,
                    "start": start,
                    "end": end,
                })
            })
            .collect();

        if phonemes.len() != alignment.characters.len() {
            warn!(
                "Alignment lists differ in length ({} characters), kept {}",
                alignment.characters.len(),
                phonemes.len()
            );
        }

        Self {
            audio_base64: Some(audio_base64.into()),
            audio: None,
            phonemes: Value::Array(phonemes),
        }
    }

    /// Phoneme timings, upper-cased; malformed entries are skipped
    pub fn phoneme_timings(&self) -> Vec<PhonemeTiming> {
        let Some(entries) = self.phonemes.as_array() else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let character = entry.get("character")?.as_str().filter(|c| !c.is_empty())?;
                let start = entry.get("start")?.as_f64()?;
                let end = entry.get("end")?.as_f64()?;
                Some(PhonemeTiming::new(character, start, end))
            })
            .collect()
    }

    /// Raw encoded audio bytes
    pub fn audio_bytes(&self) -> Result<Vec<u8>, LipSyncError> {
        let encoded = self
            .audio_base64
            .as_deref()
            .or(self.audio.as_deref())
            .filter(|encoded| !encoded.is_empty())
            .ok_or_else(|| LipSyncError::Decode("No audio data in response".to_string()))?;

        STANDARD
            .decode(encoded)
            .map_err(|e| LipSyncError::Decode(format!("Invalid base64 audio: {}", e)))
    }

    pub fn decode(&self, decoder: &dyn AudioDecoder) -> Result<SpeechClip, LipSyncError> {
        let audio = decoder.decode(&self.audio_bytes()?)?;
        let timings = self.phoneme_timings();
        Ok(SpeechClip { audio, timings })
    }
}

/// Speech source that requests a payload and decodes it locally
pub struct PayloadSpeechSource {
    transport: Arc<dyn SpeechTransport>,
    decoder: Arc<dyn AudioDecoder>,
}

impl PayloadSpeechSource {
    pub fn new(transport: Arc<dyn SpeechTransport>, decoder: Arc<dyn AudioDecoder>) -> Self {
        Self { transport, decoder }
    }
}

#[async_trait]
impl SpeechSource for PayloadSpeechSource {
    async fn fetch(&self, text: &str) -> Result<SpeechClip, LipSyncError> {
        let preview: String = text.chars().take(50).collect();
        debug!("Requesting speech with phonemes for: {}", preview);

        let body = self.transport.request(text).await?;
        let payload = SpeechPayload::from_json(&body)?;
        let clip = payload.decode(self.decoder.as_ref())?;

        info!(
            "Extracted {} phoneme timings ({:.2}s of audio)",
            clip.timings.len(),
            clip.audio.duration_secs()
        );
        Ok(clip)
    }
}
