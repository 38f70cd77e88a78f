//! Compaction history and aggregate statistics.
//!
//! Bounded ring buffer of past results. Appends are serialized behind a
//! mutex (single writer per session); reads take a snapshot. The retained
//! window is process-local — the full ledger belongs to the external
//! session store.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use strata_core::CompactionResult;

/// Aggregate metrics over the retained compaction history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactionStats {
    /// Results currently retained.
    pub total_compactions: usize,
    /// Mean compression ratio.
    pub average_compression_ratio: f64,
    /// Lowest (best) compression ratio seen.
    pub best_compression_ratio: f64,
    /// Highest (worst) compression ratio seen. May exceed 1.0.
    pub worst_compression_ratio: f64,
    /// `Σ (original_tokens − compacted_tokens)`. Signed: a pass can cost
    /// more tokens than it saved.
    pub total_tokens_saved: i64,
    /// Completion time of the most recent pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_compaction_time: Option<DateTime<Utc>>,
}

/// Append-only, bounded record of compaction results.
pub struct CompactionHistory {
    results: Mutex<VecDeque<CompactionResult>>,
    capacity: usize,
}

impl CompactionHistory {
    /// Create a history retaining at most `capacity` results.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            results: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    /// Append a result, evicting the oldest once past capacity.
    pub fn record(&self, result: CompactionResult) {
        let mut results = self.results.lock();
        if self.capacity == 0 {
            return;
        }
        while results.len() >= self.capacity {
            let _ = results.pop_front();
        }
        results.push_back(result);
    }

    /// Number of retained results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    /// Whether anything has been retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }

    /// Snapshot of the retained results, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CompactionResult> {
        self.results.lock().iter().cloned().collect()
    }

    /// Aggregate metrics over the retained window. Zeroed when empty.
    #[must_use]
    pub fn stats(&self) -> CompactionStats {
        let results = self.results.lock();
        if results.is_empty() {
            return CompactionStats::default();
        }

        let ratios: Vec<f64> = results.iter().map(|r| r.compression_ratio).collect();
        let tokens_saved: i64 = results
            .iter()
            .map(|r| r.original_tokens as i64 - r.compacted_tokens as i64)
            .sum();

        CompactionStats {
            total_compactions: results.len(),
            average_compression_ratio: ratios.iter().sum::<f64>() / ratios.len() as f64,
            best_compression_ratio: ratios.iter().copied().fold(f64::INFINITY, f64::min),
            worst_compression_ratio: ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            total_tokens_saved: tokens_saved,
            last_compaction_time: results.back().map(|r| r.metadata.compacted_at),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
