//! Compaction trigger evaluation.
//!
//! Pure function over the current sequence and static config; safe to call
//! repeatedly. Note that unscored items carry an importance of zero, so a
//! sequence that was never run through the scorer counts as entirely
//! low-importance. Score first when using the low-importance trigger.

use strata_core::ContextItem;

use crate::config::{CompactorConfig, LOW_IMPORTANCE_FRACTION};

/// Whether the sequence warrants a compaction pass.
///
/// True when estimated tokens exceed `max_context_tokens ×
/// compaction_trigger_threshold`, or when more than
/// [`LOW_IMPORTANCE_FRACTION`] of the items score below
/// `min_importance_threshold`.
#[must_use]
pub fn should_compact(items: &[ContextItem], config: &CompactorConfig) -> bool {
    let total_tokens: u64 = items.iter().map(|item| item.tokens_estimate).sum();
    let budget = config.max_context_tokens as f64 * config.compaction_trigger_threshold;
    if total_tokens as f64 > budget {
        return true;
    }

    let low_importance = items
        .iter()
        .filter(|item| item.importance_score < config.min_importance_threshold)
        .count();
    low_importance as f64 > items.len() as f64 * LOW_IMPORTANCE_FRACTION
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
