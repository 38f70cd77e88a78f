//! Importance scoring.
//!
//! Deterministic, no I/O, infallible. Each item gets a weighted sum of four
//! features normalized to `[0, 1]`, with two overrides applied afterwards:
//! pinned items score 1.0, and destructive-operation mentions multiply the
//! score by 1.2 before the final clamp.

use chrono::{DateTime, Utc};

use strata_core::{ContextItem, ImportanceWeights, ItemKind};

use crate::patterns;

/// Hours over which recency decays linearly to zero.
const RECENCY_WINDOW_HOURS: f64 = 24.0;

/// Boost factor for content mentioning destructive operations.
const DESTRUCTIVE_BOOST: f64 = 1.2;

/// Score every item in place.
///
/// Idempotent for a fixed `now`: re-running assigns the same scores. Only
/// `importance_score` is touched.
pub fn score_items(items: &mut [ContextItem], now: DateTime<Utc>, weights: &ImportanceWeights) {
    for item in items {
        item.importance_score = score_one(item, now, weights);
    }
}

fn score_one(item: &ContextItem, now: DateTime<Utc>, weights: &ImportanceWeights) -> f64 {
    let recency = recency_score(item.timestamp, now);
    let user_interaction = interaction_score(item);
    let code_relevance = (0.2 * patterns::code_indicator_hits(&item.content) as f64).min(1.0);
    let error_information =
        (0.3 * patterns::important_pattern_hits(&item.content) as f64).min(1.0);

    let mut score = weights.recency * recency
        + weights.user_interaction * user_interaction
        + weights.code_relevance * code_relevance
        + weights.error_information * error_information;

    if item.must_preserve {
        score = 1.0;
    }
    if patterns::has_destructive_keyword(&item.content) {
        score *= DESTRUCTIVE_BOOST;
    }

    score.clamp(0.0, 1.0)
}

/// Linear decay from 1.0 (now) to 0.0 (24 hours old). Future timestamps
/// clamp to 1.0.
fn recency_score(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_hours = (now - timestamp).num_milliseconds() as f64 / 3_600_000.0;
    (1.0 - age_hours / RECENCY_WINDOW_HOURS).clamp(0.0, 1.0)
}

fn interaction_score(item: &ContextItem) -> f64 {
    match item.kind {
        ItemKind::User => 1.0,
        ItemKind::Assistant if item.is_response_to_user() => 0.8,
        _ => 0.2,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
