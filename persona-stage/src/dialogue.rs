//! Dialogue generation with an emotion label per answer

use crate::error::DialogueError;
use async_trait::async_trait;
use persona_core::Emotion;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Generates a structured reply for a prompt
#[async_trait]
pub trait DialogueSource: Send + Sync {
    /// Returns the raw JSON text of the reply
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, DialogueError>;
}

/// A reply and the emotion it should be delivered with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerWithEmotion {
    pub answer: String,
    #[serde(default)]
    pub emotion: Emotion,
}

impl AnswerWithEmotion {
    /// Parse a reply; unknown emotion labels become neutral
    pub fn parse(raw: &str) -> Result<Self, DialogueError> {
        serde_json::from_str(raw).map_err(|e| DialogueError::Parse(e.to_string()))
    }
}

/// Exponential backoff for an unavailable dialogue service
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Wait after the failed attempt `attempt` (zero-based): `2^attempt * base`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Call the source, retrying only while it reports itself unavailable
///
/// No wait follows the final attempt.
pub async fn generate_with_retry(
    source: &dyn DialogueSource,
    system: &str,
    prompt: &str,
    policy: &RetryPolicy,
) -> Result<String, DialogueError> {
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 0..max_attempts {
        match source.generate(system, prompt).await {
            Ok(text) => return Ok(text),
            Err(DialogueError::Unavailable(reason)) => {
                if attempt + 1 == max_attempts {
                    error!("Dialogue service unavailable, giving up after {} attempts", max_attempts);
                    return Err(DialogueError::Exhausted {
                        attempts: max_attempts,
                        last: reason,
                    });
                }
                let delay = policy.delay_for(attempt);
                warn!(
                    "Service unavailable. Retrying in {} seconds... (Attempt {}/{})",
                    delay.as_secs_f32(),
                    attempt + 1,
                    max_attempts
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }

    Err(DialogueError::Exhausted {
        attempts: max_attempts,
        last: "no attempt completed".to_string(),
    })
}

/// Append guidance on picking an emotion to a character instruction
pub fn emotion_guidance(system: &str) -> String {
    let labels: Vec<&str> = Emotion::ALL.iter().map(|e| e.as_str()).collect();
    format!(
        "{} Reply as JSON with an \"answer\" and an \"emotion\" ({}). \
         Let the emotion follow the tone of the user's message: hostile or insulting \
         messages call for 'angry', friendly or curious ones for a matching positive emotion.",
        system.trim_end(),
        labels.join(", ")
    )
}

/// Generate an answer and its delivery emotion for `prompt`
pub async fn generate_answer_with_emotion(
    source: &dyn DialogueSource,
    system: &str,
    prompt: &str,
    policy: &RetryPolicy,
) -> Result<AnswerWithEmotion, DialogueError> {
    let instruction = emotion_guidance(system);
    let raw = generate_with_retry(source, &instruction, prompt, policy).await?;
    let answer = AnswerWithEmotion::parse(&raw)?;
    debug!("Dialogue answered with emotion {}", answer.emotion);
    Ok(answer)
}
