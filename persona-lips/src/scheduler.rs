//! Utterance scheduling: audio start, timed mouth shapes, return to rest

use crate::blend::LipSyncAnimator;
use crate::error::LipSyncError;
use crate::playback::AudioPlayback;
use crate::speech::{SpeechClip, SpeechSource};
use crate::visemes::expression_weights;
use parking_lot::Mutex;
use persona_core::{Emotion, ExpressionPreset, ExpressionSink, LipSyncConfig, PhonemeTiming, ScheduledTask};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Time the face holds after the audio ends before returning to rest
pub const REST_PADDING_SECS: f64 = 0.25;

/// A planned step of an utterance, relative to the audio start
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    Blend { phoneme: String, at: Duration },
    Rest { at: Duration },
}

impl Cue {
    pub fn at(&self) -> Duration {
        match self {
            Cue::Blend { at, .. } | Cue::Rest { at } => *at,
        }
    }
}

/// Plays utterances with synchronized mouth shapes
///
/// Utterances are not serialized against each other; callers must wait for
/// one to finish (or stop it) before starting the next.
pub struct LipSyncScheduler {
    sink: Arc<dyn ExpressionSink>,
    playback: Arc<dyn AudioPlayback>,
    speech: Arc<dyn SpeechSource>,
}

impl LipSyncScheduler {
    pub fn new(
        sink: Arc<dyn ExpressionSink>,
        playback: Arc<dyn AudioPlayback>,
        speech: Arc<dyn SpeechSource>,
    ) -> Self {
        Self { sink, playback, speech }
    }

    /// Fetch speech for `text` and start performing it
    ///
    /// Errors from the speech source abort the utterance before anything
    /// is written to the face.
    pub async fn speak(
        &self,
        text: &str,
        emotion: Option<Emotion>,
        config: &LipSyncConfig,
    ) -> Result<Utterance, LipSyncError> {
        config.validate().map_err(LipSyncError::Config)?;

        if config.debug_logging {
            let preview: String = text.chars().take(50).collect();
            debug!(
                "Starting lip sync for: {}, emotion: {}",
                preview,
                emotion.map_or("default", |e| e.as_str())
            );
        }

        let clip = match self.speech.fetch(text).await {
            Ok(clip) => clip,
            Err(e) => {
                error!("Error fetching speech: {}", e);
                return Err(e);
            }
        };
        self.perform(clip, emotion, config)
    }

    /// Speak and wait until the face is back at rest
    pub async fn speak_and_wait(
        &self,
        text: &str,
        emotion: Option<Emotion>,
        config: &LipSyncConfig,
    ) -> Result<(), LipSyncError> {
        self.speak(text, emotion, config).await?.finished().await
    }

    /// Start audio and schedule mouth shapes for an already fetched clip
    pub fn perform(
        &self,
        clip: SpeechClip,
        emotion: Option<Emotion>,
        config: &LipSyncConfig,
    ) -> Result<Utterance, LipSyncError> {
        config.validate().map_err(LipSyncError::Config)?;

        if clip.timings.is_empty() && clip.audio.is_empty() {
            warn!("No timings or audio, nothing to play");
            return Ok(Utterance::completed());
        }
        if !PhonemeTiming::is_ordered(&clip.timings) {
            warn!("Phoneme timings are not ordered by start time");
        }

        let rest_at = Duration::try_from_secs_f64(clip.audio.duration_secs() + REST_PADDING_SECS)
            .map_err(|e| LipSyncError::Decode(format!("Audio duration out of range: {}", e)))?;

        let animator = Arc::new(LipSyncAnimator::new(Arc::clone(&self.sink)));
        if let Some(emotion) = emotion {
            self.apply_base_emotion(emotion, config);
        }

        if let Err(e) = self.playback.start(&clip.audio) {
            error!("Failed to start utterance audio: {}", e);
            animator.reset();
            return Err(e);
        }
        let origin = Instant::now();
        let Some(rest_deadline) = origin.checked_add(rest_at) else {
            error!("Utterance end is past the clock range");
            self.playback.stop();
            animator.reset();
            return Err(LipSyncError::Decode("Audio duration out of range".to_string()));
        };

        if config.debug_logging {
            debug!("Playing audio and {} phoneme animations", clip.timings.len());
        }

        let intensity = config.intensity;
        let mut tasks = Vec::with_capacity(clip.timings.len() + 1);
        let mut cues = Vec::with_capacity(clip.timings.len() + 1);

        for timing in &clip.timings {
            if !timing.start.is_finite() {
                warn!("Skipping phoneme '{}' with invalid start time", timing.phoneme);
                continue;
            }
            let scheduled = Duration::try_from_secs_f64(timing.start.max(0.0))
                .ok()
                .and_then(|at| origin.checked_add(at).map(|deadline| (at, deadline)));
            let Some((at, deadline)) = scheduled else {
                warn!("Skipping phoneme '{}' with out of range start time", timing.phoneme);
                continue;
            };
            let weights = expression_weights(&timing.phoneme);
            let animator = Arc::clone(&animator);
            tasks.push(ScheduledTask::at("phoneme-blend", deadline, async move {
                animator.set_blended_expression(weights, intensity);
            }));
            cues.push(Cue::Blend {
                phoneme: timing.phoneme.clone(),
                at,
            });
        }

        let (sender, receiver) = oneshot::channel();
        let completion = Arc::new(Mutex::new(Some(sender)));
        let id = Uuid::new_v4();
        {
            let animator = Arc::clone(&animator);
            let playback = Arc::clone(&self.playback);
            let completion = Arc::clone(&completion);
            let debug_logging = config.debug_logging;
            tasks.push(ScheduledTask::at("lip-sync-rest", rest_deadline, async move {
                let Some(sender) = completion.lock().take() else {
                    return;
                };
                animator.stop();
                playback.finished();
                if debug_logging {
                    info!("Lip sync {} completed, expressions reset", id);
                }
                let _ = sender.send(());
            }));
        }
        cues.push(Cue::Rest { at: rest_at });

        Ok(Utterance {
            id,
            animator: Some(animator),
            playback: Some(Arc::clone(&self.playback)),
            tasks,
            cues,
            completion,
            done: receiver,
        })
    }

    fn apply_base_emotion(&self, emotion: Emotion, config: &LipSyncConfig) {
        let Some(target) = emotion.base_expression() else {
            return;
        };
        for preset in ExpressionPreset::EMOTIONS {
            self.sink.set_value(preset, 0.0);
        }
        self.sink.set_value(target, 1.0);
        if config.debug_logging {
            debug!("Set base emotion to: {} ({})", emotion, target);
        }
    }
}

/// A running utterance
///
/// Dropping it does not stop the utterance; use `stop`.
pub struct Utterance {
    id: Uuid,
    animator: Option<Arc<LipSyncAnimator>>,
    playback: Option<Arc<dyn AudioPlayback>>,
    tasks: Vec<ScheduledTask>,
    cues: Vec<Cue>,
    completion: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    done: oneshot::Receiver<()>,
}

impl Utterance {
    fn completed() -> Self {
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(());
        Self {
            id: Uuid::new_v4(),
            animator: None,
            playback: None,
            tasks: Vec::new(),
            cues: Vec::new(),
            completion: Arc::new(Mutex::new(None)),
            done: receiver,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Planned blends in schedule order, followed by the return to rest
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn animator(&self) -> Option<&LipSyncAnimator> {
        self.animator.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.completion.lock().is_none()
    }

    /// Cancel pending mouth shapes and return the face to rest now
    pub fn stop(&self) {
        let Some(sender) = self.completion.lock().take() else {
            return;
        };

        for task in &self.tasks {
            task.cancel();
        }
        if let Some(animator) = &self.animator {
            animator.stop();
        }
        if let Some(playback) = &self.playback {
            playback.stop();
        }
        info!("Utterance {} stopped", self.id);
        let _ = sender.send(());
    }

    /// Wait for the utterance to finish or be stopped
    pub async fn finished(self) -> Result<(), LipSyncError> {
        self.done.await.map_err(|_| LipSyncError::Abandoned)
    }
}

impl std::fmt::Debug for Utterance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Utterance")
            .field("id", &self.id)
            .field("cues", &self.cues.len())
            .field("finished", &self.is_finished())
            .finish()
    }
}
