//! Idle/talking state machine driving the pose mixer

use crate::clip::{ClipSource, RetargetedClip};
use crate::error::BodyError;
use crate::mixer::{ActionId, LoopMode, PlaybackAction, PlaybackStatus, PoseMixer};
use crate::slots::{ActionSlots, FadingAction};
use parking_lot::Mutex;
use persona_core::{AnimationPaths, BodyConfig, Emotion, RandomSource, ScheduledTask};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Behavioural state of the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationState {
    #[default]
    Idle,
    Talking,
}

/// A queued talking -> idle transition
///
/// The id is checked when the timer fires so a cancelled or replaced
/// transition can never act on newer state.
struct PendingTransition {
    id: u64,
    task: ScheduledTask,
}

struct Machine {
    state: AnimationState,
    slots: ActionSlots,
    pending_idle: Option<PendingTransition>,
    next_transition: u64,
    destroyed: bool,
}

struct Shared {
    paths: AnimationPaths,
    config: BodyConfig,
    clips: Arc<dyn ClipSource>,
    mixer: Arc<dyn PoseMixer>,
    random: RandomSource,
    machine: Mutex<Machine>,
}

impl Shared {
    fn release_faded(&self, id: ActionId) {
        let mut machine = self.machine.lock();
        if let Some(action) = machine.slots.finish_fade(id) {
            self.mixer.stop(action.id);
            self.mixer.uncache(action.id);
            info!("Cleaned up old action: {}", action.clip_name);
        }
    }
}

/// Body animation state machine
///
/// Cheap to clone; clones drive the same character. Only `start_talking`
/// and `stop_talking` change the state. Clip load failures are logged and
/// leave the body without an active action until the next successful play.
#[derive(Clone)]
pub struct BodyAnimator {
    shared: Arc<Shared>,
}

impl BodyAnimator {
    /// Create the state machine and start a random idle clip
    pub async fn new(
        paths: AnimationPaths,
        clips: Arc<dyn ClipSource>,
        mixer: Arc<dyn PoseMixer>,
        config: BodyConfig,
    ) -> Result<Self, BodyError> {
        Self::with_random_source(paths, clips, mixer, config, RandomSource::from_entropy()).await
    }

    /// Same as `new` with a caller-provided random source for clip choice
    pub async fn with_random_source(
        paths: AnimationPaths,
        clips: Arc<dyn ClipSource>,
        mixer: Arc<dyn PoseMixer>,
        config: BodyConfig,
        random: RandomSource,
    ) -> Result<Self, BodyError> {
        config.validate().map_err(BodyError::Config)?;
        paths.validate().map_err(BodyError::Config)?;

        let animator = Self {
            shared: Arc::new(Shared {
                paths,
                config,
                clips,
                mixer,
                random,
                machine: Mutex::new(Machine {
                    state: AnimationState::Idle,
                    slots: ActionSlots::new(),
                    pending_idle: None,
                    next_transition: 0,
                    destroyed: false,
                }),
            }),
        };

        animator.start_idle_animation().await;
        Ok(animator)
    }

    pub fn state(&self) -> AnimationState {
        self.shared.machine.lock().state
    }

    pub fn current_action(&self) -> Option<PlaybackAction> {
        self.shared.machine.lock().slots.active().cloned()
    }

    /// Action still fading out after a crossfade, if any
    pub fn fading_action(&self) -> Option<PlaybackAction> {
        self.shared.machine.lock().slots.fading().cloned()
    }

    /// Actions the state machine currently holds in the mixer, at most two
    pub fn held_actions(&self) -> usize {
        self.shared.machine.lock().slots.occupied()
    }

    pub fn is_transition_pending(&self) -> bool {
        self.shared.machine.lock().pending_idle.is_some()
    }

    /// Enter the talking state with a clip matching `emotion`
    ///
    /// Cancels a queued return to idle. Already talking is a no-op.
    pub async fn start_talking(&self, emotion: Option<Emotion>) {
        {
            let mut machine = self.shared.machine.lock();
            if machine.destroyed {
                warn!("startTalking ignored: animator destroyed");
                return;
            }
            if let Some(pending) = machine.pending_idle.take() {
                pending.task.cancel();
                debug!("Cancelled pending idle transition {}", pending.id);
            }
            if machine.state == AnimationState::Talking {
                return;
            }
            machine.state = AnimationState::Talking;
        }

        let emotion = emotion.unwrap_or_default();
        info!("startTalking: transitioning to talking state ({})", emotion);
        self.play_talking_animation(emotion).await;
    }

    /// Queue a return to idle after the debounce interval
    ///
    /// Ignored when not talking or when a transition is already queued.
    pub fn stop_talking(&self) {
        let mut machine = self.shared.machine.lock();
        if machine.state != AnimationState::Talking || machine.pending_idle.is_some() {
            return;
        }

        let id = machine.next_transition;
        machine.next_transition += 1;

        let weak = Arc::downgrade(&self.shared);
        let task = ScheduledTask::after("idle-transition", self.shared.config.idle_debounce(), async move {
            if let Some(shared) = weak.upgrade() {
                BodyAnimator { shared }.complete_idle_transition(id).await;
            }
        });
        machine.pending_idle = Some(PendingTransition { id, task });
        info!("stopTalking: queued transition to idle state");
    }

    /// Advance the pose mixer; call once per rendered frame
    pub fn update(&self, delta_secs: f32) {
        if !delta_secs.is_finite() || delta_secs < 0.0 {
            warn!("Ignoring invalid frame delta: {}", delta_secs);
            return;
        }
        self.shared.mixer.advance(delta_secs);
    }

    /// Cancel pending timers and stop playback; safe to call repeatedly
    pub fn destroy(&self) {
        let mixer = &self.shared.mixer;
        let mut machine = self.shared.machine.lock();

        if let Some(pending) = machine.pending_idle.take() {
            pending.task.cancel();
        }
        if let Some(fading) = machine.slots.take_fading() {
            fading.cancel_release();
            mixer.stop(fading.action.id);
            mixer.uncache(fading.action.id);
        }
        if let Some(action) = machine.slots.active_mut() {
            if action.is_playing() {
                mixer.stop(action.id);
                action.status = PlaybackStatus::Stopped;
            }
        }

        if !machine.destroyed {
            machine.destroyed = true;
            info!("Body animator destroyed");
        }
    }

    async fn complete_idle_transition(&self, id: u64) {
        let go_idle = {
            let mut machine = self.shared.machine.lock();
            match &machine.pending_idle {
                Some(pending) if pending.id == id => {}
                _ => {
                    debug!("Idle transition {} superseded", id);
                    return;
                }
            }
            machine.pending_idle = None;

            if machine.state == AnimationState::Talking && !machine.destroyed {
                machine.state = AnimationState::Idle;
                true
            } else {
                false
            }
        };

        if go_idle {
            info!("stopTalking: executing transition to idle state");
            self.start_idle_animation().await;
        }
    }

    async fn start_idle_animation(&self) {
        let path = self.shared.random.pick(&self.shared.paths.idle).cloned();
        match path {
            Some(path) => self.play_animation(&path, true).await,
            None => debug!("No idle animations configured"),
        }
    }

    async fn play_talking_animation(&self, emotion: Emotion) {
        let path = self
            .shared
            .random
            .pick(self.shared.paths.for_emotion(emotion))
            .cloned();
        match path {
            Some(path) => self.play_animation(&path, true).await,
            None => warn!("No talking animations configured for emotion '{}'", emotion),
        }
    }

    async fn load_clip(&self, path: &str) -> Result<Arc<RetargetedClip>, BodyError> {
        let clip = self.shared.clips.load(path).await?;
        if clip.is_empty() {
            return Err(BodyError::Load(format!("No animation tracks in clip: {}", path)));
        }
        Ok(clip)
    }

    async fn play_animation(&self, path: &str, looping: bool) {
        info!("Request to play: {}, loop: {}", path, looping);

        let clip = match self.load_clip(path).await {
            Ok(clip) => clip,
            Err(e) => {
                error!("Error playing animation {}: {}", path, e);
                self.abandon_current();
                return;
            }
        };

        let mixer = &self.shared.mixer;
        let mut machine = self.shared.machine.lock();
        if machine.destroyed {
            debug!("Animator destroyed while loading {}, not playing", path);
            return;
        }

        let mode = LoopMode::from_looping(looping);
        let action_id = mixer.clip_action(&clip);
        mixer.set_loop(action_id, mode);

        let mut action = PlaybackAction::new(action_id, &clip, mode);
        action.status = PlaybackStatus::Playing;

        if machine.slots.revive(action_id).is_some() {
            debug!("Reusing {} before its fade-out finished", action_id);
        }

        match machine.slots.replace_active(action) {
            Some(old) if old.clip == clip.id && old.id != action_id => {
                mixer.stop(old.id);
                mixer.uncache(old.id);
                info!("Stopped duplicate old action for clip: {}", clip.name);
                mixer.reset(action_id);
                mixer.play(action_id);
            }
            Some(old) if old.id != action_id => {
                info!("Crossfading from {} to {}", old.clip_name, clip.name);
                if !mixer.is_running(old.id) {
                    mixer.reset(old.id);
                    mixer.play(old.id);
                }
                mixer.play(action_id);
                mixer.crossfade(old.id, action_id, self.shared.config.crossfade_secs);

                let release = self.schedule_release(old.id);
                if let Some(evicted) = machine.slots.begin_fade(FadingAction::new(old, release)) {
                    evicted.cancel_release();
                    mixer.stop(evicted.action.id);
                    mixer.uncache(evicted.action.id);
                    debug!("Released {} early for a newer crossfade", evicted.action.clip_name);
                }
            }
            Some(_) => {
                info!("Resetting and playing same action instance: {}", clip.name);
                mixer.reset(action_id);
                mixer.play(action_id);
            }
            None => {
                info!("Playing initial animation: {}", clip.name);
                mixer.reset(action_id);
                mixer.play(action_id);
            }
        }
    }

    fn schedule_release(&self, id: ActionId) -> ScheduledTask {
        let weak = Arc::downgrade(&self.shared);
        ScheduledTask::after("fade-release", self.shared.config.crossfade(), async move {
            if let Some(shared) = weak.upgrade() {
                shared.release_faded(id);
            }
        })
    }

    fn abandon_current(&self) {
        let mut machine = self.shared.machine.lock();
        if let Some(action) = machine.slots.clear_active() {
            self.shared.mixer.stop(action.id);
            warn!("Cleared current action {} after load failure", action.clip_name);
        }
    }
}

impl std::fmt::Debug for BodyAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let machine = self.shared.machine.lock();
        f.debug_struct("BodyAnimator")
            .field("state", &machine.state)
            .field("slots", &machine.slots)
            .field("pending_idle", &machine.pending_idle.as_ref().map(|p| p.id))
            .finish()
    }
}
