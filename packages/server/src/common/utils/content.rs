/// Pure utility functions for content manipulation
///
/// These functions contain NO side effects - they take inputs and return outputs
/// without touching storage.

/// Length of the teaser shown in place of locked story text.
pub const SNIPPET_LENGTH: usize = 150;

/// Generate a snippet from a text body by truncation
///
/// Counts characters, not bytes, so multi-byte text never splits mid-character.
/// If the body is longer than max_length, it truncates to (max_length - 3)
/// characters and appends "...".
pub fn generate_snippet(body: &str, max_length: usize) -> String {
    let body = body.trim();
    if body.chars().count() > max_length {
        let truncate_at = max_length.saturating_sub(3);
        let head: String = body.chars().take(truncate_at).collect();
        format!("{}...", head.trim_end())
    } else {
        body.to_string()
    }
}

/// Count whitespace-separated words
pub fn word_count(body: &str) -> u32 {
    body.split_whitespace().count() as u32
}

/// Lowercase and collapse whitespace, for case-insensitive comparisons
pub fn normalize_for_comparison(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a tag name: trim, drop a leading '#', lowercase, collapse spaces.
///
/// Returns None for names that are empty after normalization.
pub fn normalize_tag_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('#');
    let normalized = normalize_for_comparison(trimmed);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
