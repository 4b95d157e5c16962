//! Plain-text helpers shared by the config loader and the content pipeline

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Fold runs of whitespace (including newlines) into a single space
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}

/// Shorten `text` to at most `length` characters, cutting at a word boundary
/// and appending an ellipsis when anything was removed.
pub fn prune(text: &str, length: usize) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }

    // One extra char tells us whether the cut falls exactly on a word boundary
    let cut: String = text.chars().take(length + 1).collect();
    let boundary = cut.rfind(char::is_whitespace).unwrap_or_else(|| {
        cut.char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or_default()
    });

    let kept = cut[..boundary].trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == ';');
    format!("{}…", kept)
}

/// Estimated reading time in whole minutes, never less than one
pub fn time_to_read(text: &str, words_per_minute: usize) -> u32 {
    let words = text.split_whitespace().count();
    let minutes = (words as f64 / words_per_minute.max(1) as f64).round() as u32;
    minutes.max(1)
}
