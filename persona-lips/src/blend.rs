//! Expression blending onto the character's face

use parking_lot::Mutex;
use persona_core::{ExpressionPreset, ExpressionSink, ExpressionWeight};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Writes blended mouth shapes for one utterance
///
/// Mirrors every value it writes so callers can inspect the face without
/// reading back from the sink. Once stopped it never writes a blend again.
pub struct LipSyncAnimator {
    sink: Arc<dyn ExpressionSink>,
    current: Mutex<BTreeMap<ExpressionPreset, f32>>,
    stop_requested: AtomicBool,
}

impl LipSyncAnimator {
    /// Create an animator and put the face in the rest pose
    pub fn new(sink: Arc<dyn ExpressionSink>) -> Self {
        let animator = Self {
            sink,
            current: Mutex::new(BTreeMap::new()),
            stop_requested: AtomicBool::new(false),
        };
        animator.write_rest_pose(&mut animator.current.lock());
        animator
    }

    /// Apply a weighted mouth shape
    ///
    /// All mouth shapes are cleared, the weights are normalised to sum to
    /// one (left as given when they sum to zero) and scaled by `intensity`.
    /// Neutral takes whatever the other shapes leave, floored at zero.
    pub fn set_blended_expression(&self, weights: &[ExpressionWeight], intensity: f32) {
        let mut current = self.current.lock();
        // reset() flips the flag under this lock, so the check cannot go stale
        if self.is_stopped() {
            return;
        }

        let total: f32 = weights.iter().map(|entry| entry.weight).sum();
        let normalizer = if total > 0.0 { 1.0 / total } else { 1.0 };

        for preset in ExpressionPreset::MOUTH {
            self.write(&mut current, preset, 0.0);
        }

        let mut shaped = 0.0;
        for entry in weights {
            let weight = entry.weight * normalizer * intensity;
            self.write(&mut current, entry.expression, weight);
            if entry.expression != ExpressionPreset::Neutral {
                shaped += weight;
            }
        }

        self.write(&mut current, ExpressionPreset::Neutral, (1.0 - shaped).max(0.0));
    }

    /// Apply a single expression at full intensity
    pub fn set_expression(&self, expression: ExpressionPreset, weight: f32) {
        self.set_blended_expression(&[ExpressionWeight::new(expression, weight)], 1.0);
    }

    /// Suppress further blends and return every preset to the rest pose
    pub fn reset(&self) {
        let mut current = self.current.lock();
        self.stop_requested.store(true, Ordering::SeqCst);
        self.write_rest_pose(&mut current);
        drop(current);
        debug!("Lip sync animator reset to rest pose");
    }

    pub fn stop(&self) {
        self.reset();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Last value written for `expression`
    pub fn value(&self, expression: ExpressionPreset) -> f32 {
        self.current.lock().get(&expression).copied().unwrap_or(0.0)
    }

    /// Sum of all mouth-shape weights currently on the face
    pub fn mouth_total(&self) -> f32 {
        let current = self.current.lock();
        ExpressionPreset::MOUTH
            .iter()
            .map(|preset| current.get(preset).copied().unwrap_or(0.0))
            .sum()
    }

    fn write_rest_pose(&self, current: &mut BTreeMap<ExpressionPreset, f32>) {
        for preset in ExpressionPreset::ALL {
            self.write(current, preset, preset.rest_weight());
        }
    }

    fn write(&self, current: &mut BTreeMap<ExpressionPreset, f32>, preset: ExpressionPreset, weight: f32) {
        current.insert(preset, weight);
        self.sink.set_value(preset, weight);
    }
}

impl std::fmt::Debug for LipSyncAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LipSyncAnimator")
            .field("current", &*self.current.lock())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
