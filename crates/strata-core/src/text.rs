//! Char-safe text preview for prompt assembly.

/// Truncate `s` to at most `max_chars` characters, appending `"..."` when
/// anything was cut.
///
/// Counts characters, not bytes, so multi-byte content never splits mid-char.
#[must_use]
pub fn preview(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
        None => s.to_owned(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
