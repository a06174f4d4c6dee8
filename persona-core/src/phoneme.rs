//! Phoneme timing data for one utterance

use serde::{Deserialize, Serialize};

/// A phoneme symbol and the window it occupies in the utterance audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhonemeTiming {
    pub phoneme: String,
    /// Seconds from the start of the utterance
    pub start: f64,
    /// Seconds from the start of the utterance
    pub end: f64,
}

impl PhonemeTiming {
    /// Build a timing, upper-casing the symbol
    pub fn new(phoneme: impl AsRef<str>, start: f64, end: f64) -> Self {
        Self {
            phoneme: phoneme.as_ref().to_uppercase(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// True when `start` never decreases across the sequence
    ///
    /// Overlapping windows are allowed; only the start order matters.
    pub fn is_ordered(timings: &[PhonemeTiming]) -> bool {
        timings.windows(2).all(|pair| pair[0].start <= pair[1].start)
    }
}
