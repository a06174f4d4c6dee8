//! Recording collaborators shared by the lip-sync tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use persona_core::{ExpressionPreset, ExpressionSink, PhonemeTiming};
use persona_lips::{AudioBuffer, AudioPlayback, LipSyncError, SpeechClip, SpeechSource, SpeechTransport};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;

/// Sink that records every write with the virtual time it happened at
pub struct RecordingSink {
    origin: Instant,
    writes: Mutex<Vec<(u128, ExpressionPreset, f32)>>,
    values: Mutex<HashMap<ExpressionPreset, f32>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            origin: Instant::now(),
            writes: Mutex::new(Vec::new()),
            values: Mutex::new(HashMap::new()),
        })
    }

    pub fn value(&self, preset: ExpressionPreset) -> f32 {
        self.values.lock().get(&preset).copied().unwrap_or(0.0)
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }

    /// Writes made at or after `millis` since the sink was created
    pub fn writes_since(&self, millis: u128) -> Vec<(u128, ExpressionPreset, f32)> {
        self.writes
            .lock()
            .iter()
            .filter(|(at, _, _)| *at >= millis)
            .copied()
            .collect()
    }

    pub fn writes_to(&self, preset: ExpressionPreset) -> Vec<(u128, f32)> {
        self.writes
            .lock()
            .iter()
            .filter(|(_, p, _)| *p == preset)
            .map(|(at, _, weight)| (*at, *weight))
            .collect()
    }

    pub fn at_rest(&self) -> bool {
        ExpressionPreset::ALL
            .iter()
            .all(|preset| self.value(*preset) == preset.rest_weight())
    }
}

impl ExpressionSink for RecordingSink {
    fn set_value(&self, expression: ExpressionPreset, weight: f32) {
        let at = self.origin.elapsed().as_millis();
        self.writes.lock().push((at, expression, weight));
        self.values.lock().insert(expression, weight);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Start { frames: usize },
    Stop,
    Finished,
}

#[derive(Default)]
pub struct RecordingPlayback {
    events: Mutex<Vec<PlaybackEvent>>,
    refuse: Mutex<bool>,
}

impl RecordingPlayback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refuse(&self) {
        *self.refuse.lock() = true;
    }

    pub fn events(&self) -> Vec<PlaybackEvent> {
        self.events.lock().clone()
    }
}

impl AudioPlayback for RecordingPlayback {
    fn start(&self, buffer: &AudioBuffer) -> Result<(), LipSyncError> {
        if *self.refuse.lock() {
            return Err(LipSyncError::Playback("device busy".to_string()));
        }
        self.events.lock().push(PlaybackEvent::Start { frames: buffer.frames() });
        Ok(())
    }

    fn stop(&self) {
        self.events.lock().push(PlaybackEvent::Stop);
    }

    fn finished(&self) {
        self.events.lock().push(PlaybackEvent::Finished);
    }
}

/// Speech source that returns a fixed clip or error
pub struct ScriptedSpeech {
    reply: Mutex<Option<Result<SpeechClip, String>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedSpeech {
    pub fn clip(timings: Vec<PhonemeTiming>, audio_secs: f64) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Some(Ok(SpeechClip {
                audio: AudioBuffer::silence(audio_secs, 16_000),
                timings,
            }))),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Some(Err(message.to_string()))),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl SpeechSource for ScriptedSpeech {
    async fn fetch(&self, text: &str) -> Result<SpeechClip, LipSyncError> {
        self.requests.lock().push(text.to_string());
        match self.reply.lock().clone() {
            Some(Ok(clip)) => Ok(clip),
            Some(Err(message)) => Err(LipSyncError::Speech(message)),
            None => Err(LipSyncError::Speech("no reply scripted".to_string())),
        }
    }
}

/// Transport returning a canned JSON body
pub struct CannedTransport(pub String);

#[async_trait]
impl SpeechTransport for CannedTransport {
    async fn request(&self, _text: &str) -> Result<String, LipSyncError> {
        Ok(self.0.clone())
    }
}

/// 16-bit mono WAV bytes of silence
pub fn wav_bytes(frames: u32, sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..frames {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}
