//! Recording collaborators shared by the body animation tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use persona_body::{
    ActionId, BodyError, ClipId, ClipSource, LoopMode, PoseMixer, RetargetedClip, Track, TrackKind,
};
use persona_core::AnimationPaths;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub fn paths() -> AnimationPaths {
    AnimationPaths {
        idle: vec!["idle/breathe.fbx".to_string()],
        neutral: vec!["talk/explain.fbx".to_string()],
        happy: vec!["talk/cheer.fbx".to_string()],
        angry: vec!["talk/stomp.fbx".to_string()],
        funny: vec!["talk/laugh.fbx".to_string()],
    }
}

fn track() -> Track {
    Track {
        name: "hips.quaternion".to_string(),
        kind: TrackKind::Rotation,
        times: vec![0.0, 1.0],
        values: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    }
}

/// Clip source that caches clips per path and records every load
#[derive(Default)]
pub struct ScriptedClips {
    loads: Mutex<Vec<String>>,
    cache: Mutex<HashMap<String, Arc<RetargetedClip>>>,
    failing: Mutex<HashSet<String>>,
    empty: Mutex<HashSet<String>>,
    next_id: Mutex<u64>,
}

impl ScriptedClips {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, path: &str) {
        self.failing.lock().insert(path.to_string());
    }

    pub fn without_tracks(&self, path: &str) {
        self.empty.lock().insert(path.to_string());
    }

    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().clone()
    }

    pub fn clip_id(&self, path: &str) -> Option<ClipId> {
        self.cache.lock().get(path).map(|clip| clip.id)
    }
}

#[async_trait]
impl ClipSource for ScriptedClips {
    async fn load(&self, path: &str) -> Result<Arc<RetargetedClip>, BodyError> {
        self.loads.lock().push(path.to_string());
        if self.failing.lock().contains(path) {
            return Err(BodyError::Load(format!("asset not found: {}", path)));
        }

        let mut cache = self.cache.lock();
        if let Some(clip) = cache.get(path) {
            return Ok(Arc::clone(clip));
        }

        let mut next_id = self.next_id.lock();
        *next_id += 1;
        let tracks = if self.empty.lock().contains(path) {
            Vec::new()
        } else {
            vec![track()]
        };
        let clip = Arc::new(RetargetedClip {
            id: ClipId(*next_id),
            name: path.to_string(),
            duration: 1.0,
            tracks,
        });
        cache.insert(path.to_string(), Arc::clone(&clip));
        Ok(clip)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MixerEvent {
    Created { clip: ClipId, action: ActionId },
    SetLoop(ActionId, LoopMode),
    Reset(ActionId),
    Play(ActionId),
    Stop(ActionId),
    Crossfade { from: ActionId, to: ActionId, secs: f32 },
    Uncache(ActionId),
    Advance(f32),
}

/// Mixer that records every call
///
/// With `fresh_actions` every `clip_action` call creates a new action, so a
/// cached clip can end up with two action instances.
#[derive(Default)]
pub struct RecordingMixer {
    fresh_actions: bool,
    events: Mutex<Vec<MixerEvent>>,
    actions: Mutex<HashMap<ClipId, ActionId>>,
    running: Mutex<HashSet<ActionId>>,
    next_id: Mutex<u64>,
}

impl RecordingMixer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_fresh_actions() -> Arc<Self> {
        Arc::new(Self {
            fresh_actions: true,
            ..Default::default()
        })
    }

    pub fn events(&self) -> Vec<MixerEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&MixerEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|event| predicate(event)).count()
    }

    pub fn crossfades(&self) -> usize {
        self.count(|event| matches!(event, MixerEvent::Crossfade { .. }))
    }

    pub fn plays(&self) -> usize {
        self.count(|event| matches!(event, MixerEvent::Play(_)))
    }

    pub fn stopped(&self, action: ActionId) -> bool {
        self.count(|event| *event == MixerEvent::Stop(action)) > 0
    }

    pub fn uncached(&self, action: ActionId) -> bool {
        self.count(|event| *event == MixerEvent::Uncache(action)) > 0
    }

    pub fn is_playing(&self, action: ActionId) -> bool {
        self.running.lock().contains(&action)
    }

    pub fn running_count(&self) -> usize {
        self.running.lock().len()
    }

    fn record(&self, event: MixerEvent) {
        self.events.lock().push(event);
    }
}

impl PoseMixer for RecordingMixer {
    fn clip_action(&self, clip: &RetargetedClip) -> ActionId {
        let mut actions = self.actions.lock();
        if !self.fresh_actions {
            if let Some(action) = actions.get(&clip.id) {
                return *action;
            }
        }
        let mut next_id = self.next_id.lock();
        *next_id += 1;
        let action = ActionId(*next_id);
        actions.insert(clip.id, action);
        self.record(MixerEvent::Created { clip: clip.id, action });
        action
    }

    fn set_loop(&self, action: ActionId, mode: LoopMode) {
        self.record(MixerEvent::SetLoop(action, mode));
    }

    fn reset(&self, action: ActionId) {
        self.record(MixerEvent::Reset(action));
    }

    fn play(&self, action: ActionId) {
        self.running.lock().insert(action);
        self.record(MixerEvent::Play(action));
    }

    fn stop(&self, action: ActionId) {
        self.running.lock().remove(&action);
        self.record(MixerEvent::Stop(action));
    }

    fn is_running(&self, action: ActionId) -> bool {
        self.running.lock().contains(&action)
    }

    fn crossfade(&self, from: ActionId, to: ActionId, duration_secs: f32) {
        self.record(MixerEvent::Crossfade {
            from,
            to,
            secs: duration_secs,
        });
    }

    fn uncache(&self, action: ActionId) {
        self.actions.lock().retain(|_, cached| *cached != action);
        self.record(MixerEvent::Uncache(action));
    }

    fn advance(&self, delta_secs: f32) {
        self.record(MixerEvent::Advance(delta_secs));
    }
}
