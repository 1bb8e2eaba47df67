//! Index-term extraction and query clean-up.
//!
//! Terms are the lowercase alphanumeric runs inside Unicode words. The same
//! function feeds both scorers and the rerank overlap check, so every stage
//! agrees on what a term is.

use std::collections::BTreeSet;
use unicode_segmentation::UnicodeSegmentation;

/// Punctuation that UAX #29 allows inside a word (`don't`, `3.14`, `a·b`).
/// Terms split there; every other non-alphanumeric char, such as a combining
/// mark or a zero-width joiner, is dropped from the term instead.
const INNER_PUNCTUATION: [char; 24] = [
    '\u{00B7}', '\u{0387}', '\u{055F}', '\u{05F4}', '\u{2018}', '\u{2019}', '\u{2024}', '\u{2027}',
    '\u{202F}', '\u{203F}', '\u{2040}', '\u{2054}', '\u{FE13}', '\u{FE33}', '\u{FE34}', '\u{FE50}',
    '\u{FE52}', '\u{FE55}', '\u{FF07}', '\u{FF0C}', '\u{FF0E}', '\u{FF1A}', '\u{FF1B}', '\u{FF3F}',
];

fn splits_term(c: char) -> bool {
    !c.is_alphanumeric() && (c.is_ascii() || c.is_whitespace() || INNER_PUNCTUATION.contains(&c))
}

/// Lazily yields the index terms of `text`.
///
/// Each word is lowercased first and then cut at inner punctuation, so a
/// lowercase mapping that introduces a combining mark (`İ`) never leaks
/// into a term. The sequence is restarted by calling `tokenize` again; the
/// same input always yields the same terms.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.unicode_words().flat_map(|word| {
        word.to_lowercase()
            .split(splits_term)
            .map(|run| run.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
            .filter(|term| !term.is_empty())
            .collect::<Vec<_>>()
    })
}

/// Distinct terms of `text`, ordered.
pub fn term_set(text: &str) -> BTreeSet<String> { tokenize(text).collect() }

/// Trims a raw user query, replaces control characters with spaces, collapses
/// whitespace runs and caps the result at `max_chars` characters.
pub fn sanitize_query(query: &str, max_chars: usize) -> String {
    let spaced: String = query.chars().map(|c| if c.is_control() { ' ' } else { c }).collect();
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_chars).collect()
}
