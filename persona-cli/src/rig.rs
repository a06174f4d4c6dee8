//! Logging collaborators for rehearsing without a renderer or audio device

use async_trait::async_trait;
use persona_body::{ActionId, BodyError, ClipId, ClipSource, LoopMode, PoseMixer, RetargetedClip, Track, TrackKind};
use persona_core::{ExpressionPreset, ExpressionSink, PhonemeTiming};
use persona_lips::{AudioBuffer, AudioPlayback, LipSyncError, SpeechClip, SpeechSource, SpeechTransport};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Seconds of speech per character when no real voice is available
const SECS_PER_CHAR: f64 = 0.08;

const SAMPLE_RATE: u32 = 16_000;

/// Clip source that fabricates a one-track clip for every reference
#[derive(Default)]
pub struct CatalogClips {
    ids: Mutex<HashMap<String, ClipId>>,
}

#[async_trait]
impl ClipSource for CatalogClips {
    async fn load(&self, path: &str) -> Result<Arc<RetargetedClip>, BodyError> {
        let mut ids = self.ids.lock();
        let next = ClipId(ids.len() as u64 + 1);
        let id = *ids.entry(path.to_string()).or_insert(next);
        debug!("Loaded clip {} as {}", path, id);

        Ok(Arc::new(RetargetedClip {
            id,
            name: path.to_string(),
            duration: 2.0,
            tracks: vec![Track {
                name: "hips.quaternion".to_string(),
                kind: TrackKind::Rotation,
                times: vec![0.0, 2.0],
                values: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            }],
        }))
    }
}

/// Mixer that logs every call
#[derive(Default)]
pub struct LogMixer {
    next_action: AtomicU64,
    running: Mutex<HashSet<ActionId>>,
    actions: Mutex<HashMap<ClipId, ActionId>>,
}

impl PoseMixer for LogMixer {
    fn clip_action(&self, clip: &RetargetedClip) -> ActionId {
        *self
            .actions
            .lock()
            .entry(clip.id)
            .or_insert_with(|| ActionId(self.next_action.fetch_add(1, Ordering::SeqCst) + 1))
    }

    fn set_loop(&self, action: ActionId, mode: LoopMode) {
        debug!("mixer: {} loop {:?}", action, mode);
    }

    fn reset(&self, action: ActionId) {
        debug!("mixer: reset {}", action);
    }

    fn play(&self, action: ActionId) {
        info!("mixer: play {}", action);
        self.running.lock().insert(action);
    }

    fn stop(&self, action: ActionId) {
        info!("mixer: stop {}", action);
        self.running.lock().remove(&action);
    }

    fn is_running(&self, action: ActionId) -> bool {
        self.running.lock().contains(&action)
    }

    fn crossfade(&self, from: ActionId, to: ActionId, duration_secs: f32) {
        info!("mixer: crossfade {} -> {} over {}s", from, to, duration_secs);
    }

    fn uncache(&self, action: ActionId) {
        debug!("mixer: uncache {}", action);
        self.actions.lock().retain(|_, cached| *cached != action);
    }

    fn advance(&self, _delta_secs: f32) {}
}

/// Sink that logs mouth and emotion weights as they change
#[derive(Default)]
pub struct LogSink;

impl ExpressionSink for LogSink {
    fn set_value(&self, expression: ExpressionPreset, weight: f32) {
        if weight > 0.0 && expression != ExpressionPreset::Neutral {
            info!("face: {} = {:.2}", expression, weight);
        } else {
            debug!("face: {} = {:.2}", expression, weight);
        }
    }
}

pub struct SilentPlayback;

impl AudioPlayback for SilentPlayback {
    fn start(&self, buffer: &AudioBuffer) -> Result<(), LipSyncError> {
        info!("audio: {:.2}s at {} Hz", buffer.duration_secs(), buffer.sample_rate());
        Ok(())
    }

    fn stop(&self) {
        info!("audio: stopped");
    }

    fn finished(&self) {
        info!("audio: finished");
    }
}

/// Speaks each character of the text at a fixed pace
pub struct PacedSpeech;

#[async_trait]
impl SpeechSource for PacedSpeech {
    async fn fetch(&self, text: &str) -> Result<SpeechClip, LipSyncError> {
        let timings: Vec<PhonemeTiming> = text
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let start = i as f64 * SECS_PER_CHAR;
                PhonemeTiming::new(c.to_string(), start, start + SECS_PER_CHAR)
            })
            .collect();
        let audio = AudioBuffer::silence(timings.len() as f64 * SECS_PER_CHAR, SAMPLE_RATE);
        Ok(SpeechClip { audio, timings })
    }
}

/// Reads a recorded speech payload from disk instead of calling a provider
pub struct PayloadFile(pub PathBuf);

#[async_trait]
impl SpeechTransport for PayloadFile {
    async fn request(&self, _text: &str) -> Result<String, LipSyncError> {
        tokio::fs::read_to_string(&self.0)
            .await
            .map_err(|e| LipSyncError::Speech(format!("Cannot read {}: {}", self.0.display(), e)))
    }
}
