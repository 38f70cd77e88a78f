//! Compaction orchestration.
//!
//! [`ContextCompactor`] wires trigger evaluation, scoring, selection, and
//! summarization into a single `compact_context` pass and records every
//! result in a bounded history. One instance owns one session's compaction;
//! the caller keeps at most one pass in flight at a time.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use strata_core::{
    CharEstimator, CompactionResult, ContextItem, ResultMetadata, TokenEstimator,
};

use crate::config::{CompactorConfig, ConfigError, ConfigUpdate};
use crate::history::{CompactionHistory, CompactionStats};
use crate::scorer;
use crate::selector;
use crate::summarizer::{GenerationService, Summarizer, fallback_summary};
use crate::trigger;

/// Summary used for the empty-input short-circuit.
const EMPTY_CONTEXT_SUMMARY: &str = "Empty context";

/// Dry-run estimate of what a compaction pass would do.
///
/// Built without calling the generation service; the summary cost is
/// approximated with the deterministic fallback text. Nothing is recorded
/// in history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactionPreview {
    /// Items in the input sequence.
    pub original_items: usize,
    /// Items that would be preserved verbatim.
    pub preserved_items: usize,
    /// Items that would be folded into the summary.
    pub discarded_items: usize,
    /// Token estimate of the input sequence.
    pub original_tokens: u64,
    /// Estimated tokens after compaction (fallback-summary approximation).
    pub estimated_compacted_tokens: u64,
    /// Estimated ratio; `1.0` for an empty input.
    pub estimated_compression_ratio: f64,
}

/// Per-session compaction orchestrator.
pub struct ContextCompactor<G> {
    config: CompactorConfig,
    summarizer: Summarizer<G>,
    estimator: Box<dyn TokenEstimator>,
    history: CompactionHistory,
}

impl<G: GenerationService> ContextCompactor<G> {
    /// Create a compactor with default configuration.
    pub fn new(service: G) -> Self {
        Self::with_config(service, CompactorConfig::default())
    }

    /// Create a compactor with explicit configuration.
    pub fn with_config(service: G, config: CompactorConfig) -> Self {
        let summarizer = Summarizer::new(service, config.summarize_timeout);
        let history = CompactionHistory::new(config.history_capacity);
        Self {
            config,
            summarizer,
            estimator: Box::new(CharEstimator),
            history,
        }
    }

    /// Replace the token estimator (test determinism, model-exact counters).
    #[must_use]
    pub fn with_estimator(mut self, estimator: Box<dyn TokenEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &CompactorConfig {
        &self.config
    }

    /// Apply a partial configuration update. Rejects invalid values without
    /// changing anything.
    pub fn configure(&mut self, update: &ConfigUpdate) -> Result<(), ConfigError> {
        self.config.apply(update)
    }

    /// Whether the sequence warrants compaction right now.
    #[must_use]
    pub fn should_compact(&self, items: &[ContextItem]) -> bool {
        trigger::should_compact(items, &self.config)
    }

    /// Run one compaction pass.
    ///
    /// Scores all items, selects the preservation set, folds the rest into
    /// a summary, and records the result. Never fails: an empty input
    /// yields the zeroed result, and summarizer failures degrade to the
    /// deterministic fallback summary.
    pub async fn compact_context(
        &self,
        items: &[ContextItem],
        instructions: Option<&str>,
    ) -> CompactionResult {
        if items.is_empty() {
            // Nothing to score, select, or summarize; the short-circuit
            // result is not recorded in history.
            return self.empty_result(instructions);
        }

        let now = Utc::now();
        let mut scored: Vec<ContextItem> = items.to_vec();
        scorer::score_items(&mut scored, now, &self.config.importance_weights);

        let preserved = selector::select_preserved(&scored, instructions, &self.config);
        let discarded = self.discard_set(&scored, &preserved);
        debug!(
            total = scored.len(),
            preserved = preserved.len(),
            discarded = discarded.len(),
            "preservation set selected"
        );

        let summary = self.summarizer.summarize(&discarded, instructions).await;

        let original_tokens: u64 = scored.iter().map(|i| i.tokens_estimate).sum();
        let preserved_tokens: u64 = preserved.iter().map(|i| i.tokens_estimate).sum();
        let compacted_tokens = preserved_tokens + self.estimator.estimate(&summary);
        let compression_ratio = ratio(original_tokens, compacted_tokens);

        let result = CompactionResult {
            original_items: scored.len(),
            compacted_items: preserved.len() + 1, // +1 for the summary entry
            original_tokens,
            compacted_tokens,
            compression_ratio,
            preserved_items: preserved,
            summary,
            metadata: ResultMetadata {
                instructions: instructions.map(str::to_owned),
                compacted_at: Utc::now(),
                preservation_criteria: self.config.criteria(),
                items_discarded: discarded.len(),
            },
        };

        info!(
            original_items = result.original_items,
            compacted_items = result.compacted_items,
            original_tokens = result.original_tokens,
            compacted_tokens = result.compacted_tokens,
            compression_ratio = result.compression_ratio,
            "context compacted"
        );
        self.history.record(result.clone());
        result
    }

    /// Compact only when [`Self::should_compact`] says so.
    pub async fn auto_compact_if_needed(
        &self,
        items: &[ContextItem],
    ) -> Option<CompactionResult> {
        if self.should_compact(items) {
            Some(self.compact_context(items, None).await)
        } else {
            None
        }
    }

    /// Estimate a pass without performing it: no generation call, no
    /// history entry, no mutation.
    #[must_use]
    pub fn preview_compaction(
        &self,
        items: &[ContextItem],
        instructions: Option<&str>,
    ) -> CompactionPreview {
        if items.is_empty() {
            return CompactionPreview {
                original_items: 0,
                preserved_items: 0,
                discarded_items: 0,
                original_tokens: 0,
                estimated_compacted_tokens: 0,
                estimated_compression_ratio: 1.0,
            };
        }

        let now = Utc::now();
        let mut scored: Vec<ContextItem> = items.to_vec();
        scorer::score_items(&mut scored, now, &self.config.importance_weights);
        let preserved = selector::select_preserved(&scored, instructions, &self.config);
        let discarded = self.discard_set(&scored, &preserved);

        let original_tokens: u64 = scored.iter().map(|i| i.tokens_estimate).sum();
        let preserved_tokens: u64 = preserved.iter().map(|i| i.tokens_estimate).sum();
        let estimated_compacted_tokens =
            preserved_tokens + self.estimator.estimate(&fallback_summary(&discarded));

        CompactionPreview {
            original_items: scored.len(),
            preserved_items: preserved.len(),
            discarded_items: discarded.len(),
            original_tokens,
            estimated_compacted_tokens,
            estimated_compression_ratio: ratio(original_tokens, estimated_compacted_tokens),
        }
    }

    /// Retained compaction history.
    #[must_use]
    pub fn history(&self) -> &CompactionHistory {
        &self.history
    }

    /// Aggregate statistics over the retained history.
    #[must_use]
    pub fn stats(&self) -> CompactionStats {
        self.history.stats()
    }

    fn discard_set(
        &self,
        scored: &[ContextItem],
        preserved: &[ContextItem],
    ) -> Vec<ContextItem> {
        let kept: std::collections::HashSet<_> = preserved.iter().map(|i| i.id).collect();
        scored.iter().filter(|i| !kept.contains(&i.id)).cloned().collect()
    }

    fn empty_result(&self, instructions: Option<&str>) -> CompactionResult {
        CompactionResult {
            original_items: 0,
            compacted_items: 0,
            original_tokens: 0,
            compacted_tokens: 0,
            compression_ratio: 1.0,
            preserved_items: vec![],
            summary: EMPTY_CONTEXT_SUMMARY.to_owned(),
            metadata: ResultMetadata {
                instructions: instructions.map(str::to_owned),
                compacted_at: Utc::now(),
                preservation_criteria: self.config.criteria(),
                items_discarded: 0,
            },
        }
    }
}

fn ratio(original_tokens: u64, compacted_tokens: u64) -> f64 {
    if original_tokens == 0 {
        1.0
    } else {
        compacted_tokens as f64 / original_tokens as f64
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use strata_core::ItemKind;

    use crate::summarizer::GenerationError;

    use super::*;

    struct CannedService;

    #[async_trait]
    impl GenerationService for CannedService {
        async fn generate(
            &self,
            _prompt: &str,
            _max_output_tokens: u32,
            _temperature: f64,
        ) -> Result<String, GenerationError> {
            Ok("summary text".to_owned())
        }
    }

    #[tokio::test]
    async fn empty_input_returns_zeroed_result() {
        let compactor = ContextCompactor::new(CannedService);
        let result = compactor.compact_context(&[], None).await;
        assert_eq!(result.original_items, 0);
        assert_eq!(result.compacted_items, 0);
        assert_eq!(result.original_tokens, 0);
        assert_eq!(result.compacted_tokens, 0);
        assert!((result.compression_ratio - 1.0).abs() < f64::EPSILON);
        assert!(result.preserved_items.is_empty());
        assert_eq!(result.summary, "Empty context");
        assert!(compactor.history().is_empty());
    }

    #[tokio::test]
    async fn preview_matches_pass_shape_without_recording() {
        let compactor = ContextCompactor::new(CannedService);
        let items: Vec<ContextItem> = (0..8)
            .map(|i| ContextItem::new(ItemKind::System, format!("note {i}")).with_tokens(100))
            .collect();

        let preview = compactor.preview_compaction(&items, None);
        assert_eq!(preview.original_items, 8);
        assert_eq!(preview.preserved_items + preview.discarded_items, 8);
        assert_eq!(preview.original_tokens, 800);
        assert!(compactor.history().is_empty());
    }

    #[tokio::test]
    async fn preview_of_empty_input() {
        let compactor = ContextCompactor::new(CannedService);
        let preview = compactor.preview_compaction(&[], None);
        assert_eq!(preview.original_items, 0);
        assert!((preview.estimated_compression_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn configure_rejects_bad_update() {
        let mut compactor = ContextCompactor::new(CannedService);
        let update = ConfigUpdate {
            min_importance_threshold: Some(-0.5),
            ..ConfigUpdate::default()
        };
        assert!(compactor.configure(&update).is_err());
        assert!((compactor.config().min_importance_threshold - 0.3).abs() < f64::EPSILON);
    }
}
