//! Stand-in collaborators for performer tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use persona_body::{ActionId, BodyError, ClipId, ClipSource, LoopMode, PoseMixer, RetargetedClip, Track, TrackKind};
use persona_core::{AnimationPaths, ExpressionPreset, ExpressionSink, PhonemeTiming};
use persona_lips::{AudioBuffer, AudioPlayback, LipSyncError, SpeechClip, SpeechSource};
use persona_stage::{DialogueError, DialogueSource};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

pub fn paths() -> AnimationPaths {
    AnimationPaths {
        idle: vec!["idle.fbx".to_string()],
        neutral: vec!["talk.fbx".to_string()],
        happy: vec!["cheer.fbx".to_string()],
        angry: vec!["stomp.fbx".to_string()],
        funny: vec!["laugh.fbx".to_string()],
    }
}

/// Clip source handing out one single-track clip per path
#[derive(Default)]
pub struct StubClips {
    ids: Mutex<HashMap<String, u64>>,
    loads: Mutex<Vec<String>>,
}

impl StubClips {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().clone()
    }
}

#[async_trait]
impl ClipSource for StubClips {
    async fn load(&self, path: &str) -> Result<Arc<RetargetedClip>, BodyError> {
        self.loads.lock().push(path.to_string());
        let mut ids = self.ids.lock();
        let next = ids.len() as u64 + 1;
        let id = *ids.entry(path.to_string()).or_insert(next);
        Ok(Arc::new(RetargetedClip {
            id: ClipId(id),
            name: path.to_string(),
            duration: 1.0,
            tracks: vec![Track {
                name: "hips.position".to_string(),
                kind: TrackKind::Position,
                times: vec![0.0],
                values: vec![0.0, 1.0, 0.0],
            }],
        }))
    }
}

/// Mixer tracking only which actions are running
#[derive(Default)]
pub struct StubMixer {
    running: Mutex<HashSet<ActionId>>,
}

impl StubMixer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn running(&self) -> usize {
        self.running.lock().len()
    }
}

impl PoseMixer for StubMixer {
    fn clip_action(&self, clip: &RetargetedClip) -> ActionId {
        ActionId(clip.id.0)
    }

    fn set_loop(&self, _action: ActionId, _mode: LoopMode) {}

    fn reset(&self, _action: ActionId) {}

    fn play(&self, action: ActionId) {
        self.running.lock().insert(action);
    }

    fn stop(&self, action: ActionId) {
        self.running.lock().remove(&action);
    }

    fn is_running(&self, action: ActionId) -> bool {
        self.running.lock().contains(&action)
    }

    fn crossfade(&self, _from: ActionId, _to: ActionId, _duration_secs: f32) {}

    fn uncache(&self, _action: ActionId) {}

    fn advance(&self, _delta_secs: f32) {}
}

/// Sink remembering the peak value written to each preset
#[derive(Default)]
pub struct PeakSink {
    current: Mutex<HashMap<ExpressionPreset, f32>>,
    peak: Mutex<HashMap<ExpressionPreset, f32>>,
}

impl PeakSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn peak(&self, preset: ExpressionPreset) -> f32 {
        self.peak.lock().get(&preset).copied().unwrap_or(0.0)
    }

    pub fn value(&self, preset: ExpressionPreset) -> f32 {
        self.current.lock().get(&preset).copied().unwrap_or(0.0)
    }
}

impl ExpressionSink for PeakSink {
    fn set_value(&self, expression: ExpressionPreset, weight: f32) {
        self.current.lock().insert(expression, weight);
        let mut peak = self.peak.lock();
        let entry = peak.entry(expression).or_insert(0.0);
        *entry = entry.max(weight);
    }
}

pub struct SilentPlayback;

impl AudioPlayback for SilentPlayback {
    fn start(&self, _buffer: &AudioBuffer) -> Result<(), LipSyncError> {
        Ok(())
    }
}

/// Speech source speaking every line as one open vowel
#[derive(Default)]
pub struct VowelSpeech {
    fail: bool,
    lines: Mutex<Vec<String>>,
}

impl VowelSpeech {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

#[async_trait]
impl SpeechSource for VowelSpeech {
    async fn fetch(&self, text: &str) -> Result<SpeechClip, LipSyncError> {
        self.lines.lock().push(text.to_string());
        if self.fail {
            return Err(LipSyncError::Speech("voice service down".to_string()));
        }
        Ok(SpeechClip {
            audio: AudioBuffer::silence(0.2, 16_000),
            timings: vec![PhonemeTiming::new("A", 0.0, 0.2)],
        })
    }
}

/// Dialogue source replaying scripted results in order
pub struct ScriptedDialogue {
    replies: Mutex<VecDeque<Result<String, DialogueError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedDialogue {
    pub fn new(replies: Vec<Result<String, DialogueError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl DialogueSource for ScriptedDialogue {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, DialogueError> {
        self.calls.lock().push((system.to_string(), prompt.to_string()));
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(DialogueError::Provider("script exhausted".to_string())))
    }
}
