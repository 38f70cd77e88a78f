//! Fixed keyword and pattern sets shared by the scorer, the selector, and
//! the summarizer's category classifier.

use std::sync::LazyLock;

use regex::Regex;

/// Substrings whose presence marks content as code-related.
///
/// Each indicator counts at most once per item, regardless of how many
/// times it occurs.
pub const CODE_INDICATORS: &[&str] = &[
    "def ", "class ", "import ", "from ", "function", ".py", ".js", ".ts", ".java", ".cpp", ".c",
];

/// Keywords that mark a destructive operation. Matching content gets an
/// importance boost so deletions stay visible after compaction.
pub const DESTRUCTIVE_KEYWORDS: &[&str] = &["delete", "remove", "drop"];

/// Case-insensitive patterns for content that should never be lost quietly:
/// errors, declarations, open work markers, and credential-like tokens.
static IMPORTANT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)error|exception|failed|failure",
        r"(?i)important|critical|urgent",
        r"(?i)def\s+\w+|class\s+\w+|function\s+\w+",
        r"(?i)todo|fixme|hack|bug",
        r"(?i)api[_\s]key|secret|password|token",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern must compile"))
    .collect()
});

/// Substrings that mark a function or class declaration.
const DECLARATION_KEYWORDS: &[&str] = &["def ", "class ", "function"];

/// Number of distinct code indicators present in `content`.
#[must_use]
pub fn code_indicator_hits(content: &str) -> usize {
    let lower = content.to_lowercase();
    CODE_INDICATORS.iter().filter(|ind| lower.contains(**ind)).count()
}

/// Number of important patterns that match `content`.
#[must_use]
pub fn important_pattern_hits(content: &str) -> usize {
    IMPORTANT_PATTERNS.iter().filter(|re| re.is_match(content)).count()
}

/// Whether any important pattern matches `content`.
#[must_use]
pub fn matches_important_pattern(content: &str) -> bool {
    IMPORTANT_PATTERNS.iter().any(|re| re.is_match(content))
}

/// Whether `content` contains a function or class declaration.
#[must_use]
pub fn has_code_declaration(content: &str) -> bool {
    DECLARATION_KEYWORDS.iter().any(|kw| content.contains(kw))
}

/// Whether `content` mentions a destructive operation (case-insensitive).
#[must_use]
pub fn has_destructive_keyword(content: &str) -> bool {
    let lower = content.to_lowercase();
    DESTRUCTIVE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_indicators_count_once_each() {
        // "def " appears twice but counts once; ".py" adds a second hit.
        let content = "def a():\ndef b():\nsee main.py";
        assert_eq!(code_indicator_hits(content), 2);
    }

    #[test]
    fn code_indicators_are_case_insensitive() {
        assert_eq!(code_indicator_hits("IMPORT os"), 1);
    }

    #[test]
    fn important_patterns_match_errors() {
        assert!(matches_important_pattern("Traceback: ValueError exception"));
        assert!(matches_important_pattern("the build FAILED"));
        assert!(!matches_important_pattern("all quiet here"));
    }

    #[test]
    fn important_patterns_match_credentials() {
        assert!(matches_important_pattern("set API_KEY=abc123"));
        assert!(matches_important_pattern("rotate the password"));
    }

    #[test]
    fn important_pattern_hits_counts_distinct_patterns() {
        // error + todo + secret → three distinct patterns.
        let content = "TODO: fix error handling for the secret store";
        assert_eq!(important_pattern_hits(content), 3);
    }

    #[test]
    fn declaration_detection() {
        assert!(has_code_declaration("def main():"));
        assert!(has_code_declaration("class Foo:"));
        assert!(has_code_declaration("function run() {}"));
        assert!(!has_code_declaration("plain prose"));
    }

    #[test]
    fn destructive_keywords_case_insensitive() {
        assert!(has_destructive_keyword("DROP TABLE users"));
        assert!(has_destructive_keyword("please remove the file"));
        assert!(!has_destructive_keyword("create the file"));
    }
}
