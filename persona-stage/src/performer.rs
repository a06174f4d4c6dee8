//! A character that answers prompts with a talking body and lip-synced speech

use crate::config::{DialogueConfig, PersonaConfig};
use crate::dialogue::{generate_answer_with_emotion, AnswerWithEmotion, DialogueSource, RetryPolicy};
use crate::error::StageError;
use persona_body::{BodyAnimator, ClipSource, PoseMixer};
use persona_core::{Emotion, ExpressionSink, LipSyncConfig};
use persona_lips::{AudioPlayback, LipSyncScheduler, SpeechSource};
use std::sync::Arc;
use tracing::{error, info};

struct DialogueBinding {
    source: Arc<dyn DialogueSource>,
    system_prompt: String,
    retry: RetryPolicy,
}

/// Drives body and face together for one character
pub struct Performer {
    body: BodyAnimator,
    lips: LipSyncScheduler,
    lip_sync: LipSyncConfig,
    dialogue: Option<DialogueBinding>,
}

impl Performer {
    pub fn new(body: BodyAnimator, lips: LipSyncScheduler, lip_sync: LipSyncConfig) -> Self {
        Self {
            body,
            lips,
            lip_sync,
            dialogue: None,
        }
    }

    /// Build body animation and lip sync from a validated configuration
    pub async fn from_config(
        config: &PersonaConfig,
        clips: Arc<dyn ClipSource>,
        mixer: Arc<dyn PoseMixer>,
        sink: Arc<dyn ExpressionSink>,
        playback: Arc<dyn AudioPlayback>,
        speech: Arc<dyn SpeechSource>,
    ) -> Result<Self, StageError> {
        config.validate()?;
        let body = BodyAnimator::new(config.animations.clone(), clips, mixer, config.body.clone()).await?;
        let lips = LipSyncScheduler::new(sink, playback, speech);
        info!("Performer ready with {} animation clips", config.animations.len());
        Ok(Self::new(body, lips, config.lip_sync.clone()))
    }

    pub fn with_dialogue(mut self, source: Arc<dyn DialogueSource>, config: &DialogueConfig) -> Self {
        self.dialogue = Some(DialogueBinding {
            source,
            system_prompt: config.system_prompt.clone(),
            retry: config.retry_policy(),
        });
        self
    }

    pub fn body(&self) -> &BodyAnimator {
        &self.body
    }

    pub fn lip_sync_config(&self) -> &LipSyncConfig {
        &self.lip_sync
    }

    /// Say `text` with a talking body, returning once the face is at rest
    ///
    /// The body is asked to return to idle even when lip sync fails.
    pub async fn perform_line(&self, text: &str, emotion: Emotion) -> Result<(), StageError> {
        self.body.start_talking(Some(emotion)).await;
        let result = self.lips.speak_and_wait(text, Some(emotion), &self.lip_sync).await;
        self.body.stop_talking();

        if let Err(e) = &result {
            error!("Lip sync failed: {}", e);
        }
        Ok(result?)
    }

    /// Ask the dialogue source for an answer and perform it
    pub async fn respond(&self, prompt: &str) -> Result<AnswerWithEmotion, StageError> {
        let dialogue = self
            .dialogue
            .as_ref()
            .ok_or_else(|| StageError::Config("No dialogue source configured".to_string()))?;

        let answer = generate_answer_with_emotion(
            dialogue.source.as_ref(),
            &dialogue.system_prompt,
            prompt,
            &dialogue.retry,
        )
        .await?;
        info!("Answering with emotion {}", answer.emotion);

        self.perform_line(&answer.answer, answer.emotion).await?;
        Ok(answer)
    }

    /// Stop all animation; the performer cannot be used afterwards
    pub fn shutdown(&self) {
        self.body.destroy();
    }
}

impl std::fmt::Debug for Performer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Performer")
            .field("body", &self.body)
            .field("lip_sync", &self.lip_sync)
            .field("dialogue", &self.dialogue.is_some())
            .finish()
    }
}
