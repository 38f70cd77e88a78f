//! Preservation selection.
//!
//! Builds the set of items that survive compaction verbatim: pinned items,
//! the most recent items, high-importance items, and directive-driven
//! extras parsed from free-text instructions. The output preserves the
//! original sequence order and is deduplicated by item ID.

use std::collections::HashSet;

use strata_core::{ContextItem, ItemId, ItemKind};

use crate::config::{CompactorConfig, HIGH_IMPORTANCE_THRESHOLD};
use crate::patterns;

/// Recent-item count in force when the `Recent` directive is present.
const DIRECTIVE_RECENT_COUNT: usize = 10;

/// Preservation directives recognized in free-text instructions.
///
/// Each directive pairs a substring detector with a per-item predicate.
/// Extending the instruction vocabulary means adding a variant here and a
/// row in the directive table; nothing else changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PreserveDirective {
    /// Keep file/command items and declaration-bearing content.
    Code,
    /// Keep everything matching an important pattern.
    Errors,
    /// Widen the recent-item window to ten.
    Recent,
}

impl PreserveDirective {
    /// Directive table: trigger substring → directive.
    const ALL: &'static [(&'static str, PreserveDirective)] = &[
        ("code", PreserveDirective::Code),
        ("error", PreserveDirective::Errors),
        ("recent", PreserveDirective::Recent),
    ];

    /// Detect every directive mentioned in `instructions`.
    #[must_use]
    pub fn detect(instructions: &str) -> Vec<PreserveDirective> {
        let lower = instructions.to_lowercase();
        Self::ALL
            .iter()
            .filter(|(trigger, _)| lower.contains(trigger))
            .map(|&(_, directive)| directive)
            .collect()
    }

    /// Whether this directive keeps `item`. `Recent` is window-based, not
    /// per-item, and always returns false here.
    #[must_use]
    pub fn keeps(self, item: &ContextItem) -> bool {
        match self {
            Self::Code => {
                matches!(item.kind, ItemKind::File | ItemKind::Command)
                    || patterns::has_code_declaration(&item.content)
            }
            Self::Errors => patterns::matches_important_pattern(&item.content),
            Self::Recent => false,
        }
    }
}

/// Select the items preserved verbatim through a compaction pass.
///
/// Union of pinned items, the `preserve_recent_count` most recent, items at
/// or above [`HIGH_IMPORTANCE_THRESHOLD`], and directive extras. Output
/// order follows the input sequence; each item appears at most once.
#[must_use]
pub fn select_preserved(
    items: &[ContextItem],
    instructions: Option<&str>,
    config: &CompactorConfig,
) -> Vec<ContextItem> {
    let directives = instructions.map(PreserveDirective::detect).unwrap_or_default();

    let recent_count = if directives.contains(&PreserveDirective::Recent) {
        config.preserve_recent_count.max(DIRECTIVE_RECENT_COUNT)
    } else {
        config.preserve_recent_count
    };

    let mut keep: HashSet<ItemId> = HashSet::new();

    for item in items {
        if item.must_preserve || item.importance_score >= HIGH_IMPORTANCE_THRESHOLD {
            let _ = keep.insert(item.id);
        }
    }

    // Most recent by timestamp; stable sort keeps sequence order for ties.
    let mut by_recency: Vec<&ContextItem> = items.iter().collect();
    by_recency.sort_by_key(|item| std::cmp::Reverse(item.timestamp));
    for item in by_recency.into_iter().take(recent_count) {
        let _ = keep.insert(item.id);
    }

    for directive in &directives {
        for item in items {
            if directive.keeps(item) {
                let _ = keep.insert(item.id);
            }
        }
    }

    items
        .iter()
        .filter(|item| keep.contains(&item.id))
        .cloned()
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
