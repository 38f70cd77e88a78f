//! Discard-set summarization.
//!
//! Groups discarded items into fixed categories, builds one structured
//! prompt, and makes a single bounded call to the generation service. Every
//! failure mode — transport error, quota, malformed response, deadline —
//! collapses into a deterministic fallback built from the category counts.
//! Callers never see an error from this module.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use strata_core::{ContextItem, ItemKind, text};

/// Output budget for the generation call.
const MAX_SUMMARY_TOKENS: u32 = 2048;

/// Low temperature: summaries should be stable, not creative.
const SUMMARY_TEMPERATURE: f64 = 0.1;

/// Example items quoted per category in the prompt.
const EXAMPLES_PER_CATEGORY: usize = 3;

/// Character budget per quoted example.
const EXAMPLE_PREVIEW_CHARS: usize = 200;

/// Returned when the discard set is empty; no external call is made.
pub const EMPTY_DISCARD_SUMMARY: &str = "No items were compacted.";

/// Errors a generation service may report. All of them are soft from the
/// summarizer's point of view.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The call did not complete within its deadline.
    #[error("generation timed out")]
    Timeout,

    /// The service rejected the call for quota/rate reasons.
    #[error("quota exhausted: {0}")]
    Quota(String),

    /// The service answered but the response was unusable.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),
}

/// External text-generation collaborator.
///
/// The engine only needs "succeeded with text" or "failed"; implementations
/// are free to map their own error taxonomy onto [`GenerationError`].
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate a completion for `prompt` within the given bounds.
    async fn generate(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        temperature: f64,
    ) -> Result<String, GenerationError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Categories
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed summary categories, in presentation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Category {
    UserCommands,
    AssistantResponses,
    FileOperations,
    CodeSnippets,
    Errors,
    Other,
}

impl Category {
    const ORDER: [Category; 6] = [
        Category::UserCommands,
        Category::AssistantResponses,
        Category::FileOperations,
        Category::CodeSnippets,
        Category::Errors,
        Category::Other,
    ];

    fn title(self) -> &'static str {
        match self {
            Self::UserCommands => "User Commands",
            Self::AssistantResponses => "Assistant Responses",
            Self::FileOperations => "File Operations",
            Self::CodeSnippets => "Code Snippets",
            Self::Errors => "Errors and Problems",
            Self::Other => "Other Activity",
        }
    }

    /// Kind-based first, then content-based; first match wins.
    fn classify(item: &ContextItem) -> Self {
        match item.kind {
            ItemKind::User => Self::UserCommands,
            ItemKind::Assistant => Self::AssistantResponses,
            ItemKind::File => Self::FileOperations,
            ItemKind::System | ItemKind::Command => {
                if crate::patterns::has_code_declaration(&item.content) {
                    Self::CodeSnippets
                } else if crate::patterns::matches_important_pattern(&item.content) {
                    Self::Errors
                } else {
                    Self::Other
                }
            }
        }
    }
}

/// Partition items into non-empty categories, presentation order.
fn group_items(items: &[ContextItem]) -> Vec<(Category, Vec<&ContextItem>)> {
    Category::ORDER
        .iter()
        .filter_map(|&category| {
            let members: Vec<&ContextItem> = items
                .iter()
                .filter(|item| Category::classify(item) == category)
                .collect();
            if members.is_empty() { None } else { Some((category, members)) }
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Summarizer
// ─────────────────────────────────────────────────────────────────────────────

/// Produces the summary that replaces the discard set.
pub struct Summarizer<G> {
    service: G,
    timeout: Duration,
}

impl<G: GenerationService> Summarizer<G> {
    /// Create a summarizer with the given deadline for the external call.
    pub fn new(service: G, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Summarize the discard set. Never fails; the worst case is the
    /// deterministic fallback.
    pub async fn summarize(&self, items: &[ContextItem], instructions: Option<&str>) -> String {
        if items.is_empty() {
            return EMPTY_DISCARD_SUMMARY.to_owned();
        }

        let groups = group_items(items);
        let prompt = build_prompt(&groups, instructions);
        debug!(items = items.len(), prompt_chars = prompt.len(), "requesting summary");

        let call = self.service.generate(&prompt, MAX_SUMMARY_TOKENS, SUMMARY_TEMPERATURE);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(generated)) => compose_summary(&generated, items, &groups),
            Ok(Err(err)) => {
                warn!(error = %err, "summary generation failed, using fallback");
                fallback_from_groups(&groups)
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "summary generation hit deadline, using fallback");
                fallback_from_groups(&groups)
            }
        }
    }
}

/// Deterministic summary built purely from category counts.
///
/// Used directly by compaction previews; the summarizer falls back to it
/// when the generation call fails.
#[must_use]
pub fn fallback_summary(items: &[ContextItem]) -> String {
    if items.is_empty() {
        return EMPTY_DISCARD_SUMMARY.to_owned();
    }
    fallback_from_groups(&group_items(items))
}

fn build_prompt(groups: &[(Category, Vec<&ContextItem>)], instructions: Option<&str>) -> String {
    let mut lines: Vec<String> = vec![
        "Write a concise, informative summary of the following development session:".to_owned(),
        String::new(),
    ];

    for (category, members) in groups {
        lines.push(format!("### {}:", category.title()));
        for item in members.iter().take(EXAMPLES_PER_CATEGORY) {
            lines.push(format!("- {}", text::preview(&item.content, EXAMPLE_PREVIEW_CHARS)));
        }
        if members.len() > EXAMPLES_PER_CATEGORY {
            lines.push(format!("... and {} more items", members.len() - EXAMPLES_PER_CATEGORY));
        }
        lines.push(String::new());
    }

    lines.extend(
        [
            "Summary instructions:",
            "- Focus on key outcomes and important results",
            "- Mention errors encountered and how they were resolved",
            "- Highlight files created or modified",
            "- Use clear, concise language",
            "- At most 3 paragraphs",
        ]
        .map(str::to_owned),
    );

    if let Some(extra) = instructions {
        lines.push(format!("- Additional instructions: {extra}"));
    }

    lines.join("\n")
}

/// Generated text plus the deterministic statistics footer.
fn compose_summary(
    generated: &str,
    items: &[ContextItem],
    groups: &[(Category, Vec<&ContextItem>)],
) -> String {
    let content_types: Vec<String> = groups
        .iter()
        .map(|(category, members)| format!("{} ({})", category.title(), members.len()))
        .collect();

    format!(
        "## Compacted Session Summary\n\n{generated}\n\n### Statistics\n\
         - Items compacted: {}\n- Period: {}\n- Content types: {}\n\n\
         *Generated automatically by context compaction.*",
        items.len(),
        time_range(items),
        content_types.join(", "),
    )
}

fn fallback_from_groups(groups: &[(Category, Vec<&ContextItem>)]) -> String {
    let total: usize = groups.iter().map(|(_, members)| members.len()).sum();
    let mut lines = vec![
        "## Session Summary".to_owned(),
        format!("Total of {total} activities processed:"),
    ];
    for (category, members) in groups {
        lines.push(format!("- {}: {} items", category.title(), members.len()));
    }
    lines.join("\n")
}

/// Human-readable span of the discarded items.
fn time_range(items: &[ContextItem]) -> String {
    let Some(start) = items.iter().map(|i| i.timestamp).min() else {
        return "n/a".to_owned();
    };
    let end = items.iter().map(|i| i.timestamp).max().unwrap_or(start);
    format_range(start, end)
}

fn format_range(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    if start.date_naive() == end.date_naive() {
        format!(
            "{} - {} ({})",
            start.format("%H:%M"),
            end.format("%H:%M"),
            start.format("%d/%m/%Y"),
        )
    } else {
        format!("{} - {}", start.format("%d/%m %H:%M"), end.format("%d/%m %H:%M"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    struct CannedService(String);

    #[async_trait]
    impl GenerationService for CannedService {
        async fn generate(
            &self,
            _prompt: &str,
            _max_output_tokens: u32,
            _temperature: f64,
        ) -> Result<String, GenerationError> {
            Ok(self.0.clone())
        }
    }

    struct FailingService;

    #[async_trait]
    impl GenerationService for FailingService {
        async fn generate(
            &self,
            _prompt: &str,
            _max_output_tokens: u32,
            _temperature: f64,
        ) -> Result<String, GenerationError> {
            Err(GenerationError::Quota("daily limit".into()))
        }
    }

    struct StalledService;

    #[async_trait]
    impl GenerationService for StalledService {
        async fn generate(
            &self,
            _prompt: &str,
            _max_output_tokens: u32,
            _temperature: f64,
        ) -> Result<String, GenerationError> {
            std::future::pending().await
        }
    }

    fn discard_set() -> Vec<ContextItem> {
        vec![
            ContextItem::new(ItemKind::User, "run the tests"),
            ContextItem::new(ItemKind::Assistant, "tests passed"),
            ContextItem::new(ItemKind::File, "src/lib.rs"),
            ContextItem::new(ItemKind::System, "def helper(): pass"),
            ContextItem::new(ItemKind::System, "error: connection refused"),
            ContextItem::new(ItemKind::System, "routine log line"),
        ]
    }

    // -- classification --

    #[test]
    fn classification_is_kind_first() {
        // A user item full of error words still lands in user commands.
        let item = ContextItem::new(ItemKind::User, "error error error");
        assert_eq!(Category::classify(&item), Category::UserCommands);
    }

    #[test]
    fn classification_falls_through_to_content() {
        let code = ContextItem::new(ItemKind::Command, "cat a.sh\nfunction deploy() {}");
        assert_eq!(Category::classify(&code), Category::CodeSnippets);

        let failed = ContextItem::new(ItemKind::Command, "make: *** build failed");
        assert_eq!(Category::classify(&failed), Category::Errors);

        let plain = ContextItem::new(ItemKind::System, "session resumed");
        assert_eq!(Category::classify(&plain), Category::Other);
    }

    #[test]
    fn grouping_drops_empty_categories() {
        let items = vec![ContextItem::new(ItemKind::User, "hi")];
        let groups = group_items(&items);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, Category::UserCommands);
    }

    // -- prompt --

    #[test]
    fn prompt_includes_categories_and_examples() {
        let items = discard_set();
        let prompt = build_prompt(&group_items(&items), None);
        assert!(prompt.contains("### User Commands:"));
        assert!(prompt.contains("- run the tests"));
        assert!(prompt.contains("### Errors and Problems:"));
        assert!(prompt.contains("At most 3 paragraphs"));
    }

    #[test]
    fn prompt_truncates_long_examples() {
        let long = "x".repeat(500);
        let items = vec![ContextItem::new(ItemKind::User, long)];
        let prompt = build_prompt(&group_items(&items), None);
        assert!(prompt.contains(&format!("- {}...", "x".repeat(200))));
        assert!(!prompt.contains(&"x".repeat(201)));
    }

    #[test]
    fn prompt_notes_overflow_beyond_three_examples() {
        let items: Vec<ContextItem> =
            (0..5).map(|i| ContextItem::new(ItemKind::User, format!("cmd {i}"))).collect();
        let prompt = build_prompt(&group_items(&items), None);
        assert!(prompt.contains("... and 2 more items"));
    }

    #[test]
    fn prompt_appends_caller_instructions() {
        let items = vec![ContextItem::new(ItemKind::User, "hi")];
        let prompt = build_prompt(&group_items(&items), Some("emphasize the migration"));
        assert!(prompt.contains("Additional instructions: emphasize the migration"));
    }

    // -- summarize --

    #[tokio::test]
    async fn empty_discard_set_skips_the_call() {
        let summarizer = Summarizer::new(StalledService, Duration::from_secs(1));
        // Would hang if the service were called.
        let summary = summarizer.summarize(&[], None).await;
        assert_eq!(summary, EMPTY_DISCARD_SUMMARY);
    }

    #[tokio::test]
    async fn success_appends_statistics_footer() {
        let summarizer =
            Summarizer::new(CannedService("The session went well.".into()), Duration::from_secs(1));
        let items = discard_set();
        let summary = summarizer.summarize(&items, None).await;
        assert!(summary.contains("The session went well."));
        assert!(summary.contains("Items compacted: 6"));
        assert!(summary.contains("User Commands (1)"));
        assert!(summary.contains("Errors and Problems (1)"));
    }

    #[tokio::test]
    async fn service_error_yields_category_count_fallback() {
        let summarizer = Summarizer::new(FailingService, Duration::from_secs(1));
        let items = discard_set();
        let summary = summarizer.summarize(&items, None).await;
        assert!(summary.contains("Total of 6 activities processed:"));
        assert!(summary.contains("- User Commands: 1 items"));
        assert!(summary.contains("- Other Activity: 1 items"));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_yields_fallback() {
        let summarizer = Summarizer::new(StalledService, Duration::from_secs(30));
        let items = discard_set();
        let summary = summarizer.summarize(&items, None).await;
        assert!(summary.contains("## Session Summary"));
        assert!(summary.contains("activities processed"));
    }

    // -- time range --

    #[test]
    fn same_day_range_format() {
        let start = Utc.with_ymd_and_hms(2026, 3, 14, 9, 5, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 14, 17, 45, 0).unwrap();
        assert_eq!(format_range(start, end), "09:05 - 17:45 (14/03/2026)");
    }

    #[test]
    fn cross_day_range_format() {
        let start = Utc.with_ymd_and_hms(2026, 3, 14, 23, 50, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 15, 0, 10, 0).unwrap();
        assert_eq!(format_range(start, end), "14/03 23:50 - 15/03 00:10");
    }

    // -- fallback --

    #[test]
    fn fallback_summary_is_deterministic() {
        let items = discard_set();
        assert_eq!(fallback_summary(&items), fallback_summary(&items));
    }
}
