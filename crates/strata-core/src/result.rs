//! Compaction results and their audit metadata.
//!
//! A [`CompactionResult`] is produced once per compaction pass, is immutable
//! afterwards, and is what the external session store persists. Fields are
//! serialized with camelCase keys so the payload shape is stable across
//! consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::ContextItem;

/// Weights for the four importance-scoring features.
///
/// Each weight applies to a feature already normalized to `[0, 1]`; the
/// weighted sum is clamped back into `[0, 1]` after overrides.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportanceWeights {
    /// Linear 24-hour age decay.
    pub recency: f64,
    /// User messages and direct replies to the user.
    pub user_interaction: f64,
    /// Code indicator density.
    pub code_relevance: f64,
    /// Error / credential / declaration pattern density.
    pub error_information: f64,
}

impl Default for ImportanceWeights {
    fn default() -> Self {
        Self {
            recency: 0.3,
            user_interaction: 0.4,
            code_relevance: 0.2,
            error_information: 0.1,
        }
    }
}

/// Snapshot of the selection criteria in force during one compaction pass.
///
/// Stored in [`ResultMetadata`] so a persisted result explains itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreservationCriteria {
    /// How many most-recent items were kept unconditionally.
    pub preserve_recent_count: usize,
    /// Importance threshold below which items count as low-importance.
    pub min_importance_threshold: f64,
    /// Scoring weights in force.
    pub importance_weights: ImportanceWeights,
    /// Informational target ratio; never enforced by the selector.
    pub target_compression_ratio: f64,
}

/// Audit metadata attached to every [`CompactionResult`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Free-text instructions supplied by the caller, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// When the pass completed.
    pub compacted_at: DateTime<Utc>,
    /// Selection criteria snapshot.
    pub preservation_criteria: PreservationCriteria,
    /// How many items were folded into the summary.
    pub items_discarded: usize,
}

/// Outcome of one compaction pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactionResult {
    /// Items in the input sequence.
    pub original_items: usize,
    /// Items after compaction: preserved items plus one summary entry.
    pub compacted_items: usize,
    /// Token estimate of the input sequence.
    pub original_tokens: u64,
    /// Token estimate after compaction (preserved items + summary).
    pub compacted_tokens: u64,
    /// `compacted_tokens / original_tokens`; `1.0` when the input was empty.
    ///
    /// Can exceed `1.0` when discarded items were shorter than the summary
    /// that replaced them. That is reported as-is, not corrected.
    pub compression_ratio: f64,
    /// Items kept verbatim, in original sequence order, no duplicates.
    pub preserved_items: Vec<ContextItem>,
    /// Generated (or fallback) summary of the discarded items.
    pub summary: String,
    /// Audit metadata.
    pub metadata: ResultMetadata,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
