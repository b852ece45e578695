// src/utils/text.rs
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RUN_RE")
});

/// Trims the text and collapses every whitespace run (including non-breaking
/// spaces) into a single ASCII space.
pub fn clean_text(raw: &str) -> String {
    let normalized = raw.replace('\u{a0}', " ");
    WHITESPACE_RUN_RE
        .replace_all(normalized.trim(), " ")
        .into_owned()
}

/// Removes every whitespace character from the text.
pub fn strip_whitespace(raw: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(raw, "").into_owned()
}
