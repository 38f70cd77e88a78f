//! Context items — the units of conversational history the engine compacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::ItemId;

/// What kind of history entry a [`ContextItem`] represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A message typed by the user.
    User,
    /// A model response.
    Assistant,
    /// System-injected content (prompts, notices).
    System,
    /// A file read or written during the session.
    File,
    /// A shell or tool command and its output.
    Command,
}

/// One unit of session history subject to compaction.
///
/// Created by the calling layer and appended to a session-scoped sequence.
/// The engine only ever mutates [`importance_score`](Self::importance_score);
/// everything else is caller-owned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextItem {
    /// Caller-assigned unique ID, used for deduplication.
    pub id: ItemId,
    /// Raw text content.
    pub content: String,
    /// Entry kind.
    pub kind: ItemKind,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Normalized importance in `[0, 1]`. Zero until scored; set only by
    /// the importance scorer.
    #[serde(default)]
    pub importance_score: f64,
    /// Arbitrary caller metadata (e.g. `response_to_user: true`).
    #[serde(default)]
    pub metadata: serde_json::Map<String, Value>,
    /// Approximate token cost, used for budget accounting.
    #[serde(default)]
    pub tokens_estimate: u64,
    /// Caller pin: a pinned item always survives compaction verbatim.
    #[serde(default)]
    pub must_preserve: bool,
}

impl ContextItem {
    /// Create an item with a fresh ID and the current time.
    #[must_use]
    pub fn new(kind: ItemKind, content: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            content: content.into(),
            kind,
            timestamp: Utc::now(),
            importance_score: 0.0,
            metadata: serde_json::Map::new(),
            tokens_estimate: 0,
            must_preserve: false,
        }
    }

    /// Set the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the token estimate.
    #[must_use]
    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.tokens_estimate = tokens;
        self
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        let _ = self.metadata.insert(key.into(), value);
        self
    }

    /// Pin the item so it always survives compaction.
    #[must_use]
    pub fn pinned(mut self) -> Self {
        self.must_preserve = true;
        self
    }

    /// Whether the caller marked this assistant item as a direct reply to
    /// the user (`response_to_user: true` in metadata).
    #[must_use]
    pub fn is_response_to_user(&self) -> bool {
        self.metadata
            .get("response_to_user")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
