//! Token estimation.
//!
//! Budget accounting works on an approximation, not the model's exact
//! tokenizer output. The estimator is injectable so tests can pin exact
//! numbers.

/// Characters per token for the character-based approximation.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimates the token cost of a piece of text.
pub trait TokenEstimator: Send + Sync {
    /// Approximate token count for `text`.
    fn estimate(&self, text: &str) -> u64;
}

/// Default estimator: one token per [`CHARS_PER_TOKEN`] characters.
#[derive(Clone, Copy, Debug, Default)]
pub struct CharEstimator;

impl TokenEstimator for CharEstimator {
    fn estimate(&self, text: &str) -> u64 {
        (text.len() / CHARS_PER_TOKEN) as u64
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
