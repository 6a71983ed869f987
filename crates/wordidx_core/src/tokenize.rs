//! Text normalization.
//!
//! A token is a whitespace-separated word reduced to its ASCII letters and
//! lowercased. Words with no letters produce no token.

/// Normalizes one word. Returns an empty string if no letters remain.
#[must_use]
pub fn normalize(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Splits `text` on whitespace and normalizes each word, dropping empties.
pub fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(normalize)
        .filter(|t| !t.is_empty())
}
