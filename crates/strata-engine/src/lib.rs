//! # strata-engine
//!
//! Keeps a growing session context within a bounded token budget by scoring
//! each item's importance, keeping a selected subset verbatim, and folding
//! the rest into a generated summary.
//!
//! - **Trigger**: decides whether compaction should run (budget utilization
//!   or low-importance fraction)
//! - **Scorer**: deterministic four-feature importance scoring
//! - **Selector**: order-preserving preservation set with directive-driven
//!   extras
//! - **Summarizer**: category-grouped prompt, one bounded external call,
//!   deterministic fallback on any failure
//! - **Compactor**: wires the phases into `compact_context` and records
//!   results in a bounded history
//!
//! ## Entry Point
//!
//! [`ContextCompactor`] — created per session; the caller enforces at most
//! one in-flight compaction per instance.
//!
//! ## Key Invariant
//!
//! Within one pass, scoring strictly precedes selection, which strictly
//! precedes summarization. The only suspension point is the generation call.

#![deny(unsafe_code)]

pub mod compactor;
pub mod config;
pub mod history;
pub mod patterns;
pub mod scorer;
pub mod selector;
pub mod summarizer;
pub mod trigger;

pub use compactor::{CompactionPreview, ContextCompactor};
pub use config::{CompactorConfig, ConfigError, ConfigUpdate, WeightUpdate};
pub use history::{CompactionHistory, CompactionStats};
pub use scorer::score_items;
pub use selector::{PreserveDirective, select_preserved};
pub use summarizer::{GenerationError, GenerationService, Summarizer};
pub use trigger::should_compact;
