//! Tokenizer adapter.
//!
//! The actual n-gram/word splitting rules belong to an external tokenizer;
//! this module only owns the *contract* this crate needs from it (split on
//! delimiters, filter by minimum word size) plus the deduplication behavior
//! layered on top for queries and documents.

use rustc_hash::FxHashMap;

use crate::config::DelimiterSet;
use crate::token::StringSlice;

/// Split `text` into [`StringSlice`] tokens, dropping anything shorter than
/// `min_word_size` bytes.
///
/// # Example
///
/// ```
/// use lexical_coverage::config::DelimiterSet;
/// use lexical_coverage::tokenizer::tokenize;
///
/// let text = "I am a test";
/// let delimiters = DelimiterSet::default();
/// let tokens = tokenize(text, 2, &delimiters);
/// let words: Vec<&str> = tokens.iter().map(|t| t.text(text)).collect();
/// assert_eq!(words, vec!["am", "test"]);
/// ```
pub fn tokenize(text: &str, min_word_size: usize, delimiters: &DelimiterSet) -> Vec<StringSlice> {
    split_raw(text, delimiters)
        .into_iter()
        .filter(|s| s.length as usize >= min_word_size)
        .collect()
}

/// Split `text` with no minimum-length filter, for the lexical fusion signals
/// which operate over the unfiltered token stream.
///
/// # Example
///
/// ```
/// use lexical_coverage::config::DelimiterSet;
/// use lexical_coverage::tokenizer::tokenize_unfiltered;
///
/// let text = "a b cd";
/// let delimiters = DelimiterSet::default();
/// let tokens = tokenize_unfiltered(text, &delimiters);
/// let words: Vec<&str> = tokens.iter().map(|t| t.text(text)).collect();
/// assert_eq!(words, vec!["a", "b", "cd"]);
/// ```
pub fn tokenize_unfiltered(text: &str, delimiters: &DelimiterSet) -> Vec<StringSlice> {
    split_raw(text, delimiters)
}

fn split_raw(text: &str, delimiters: &DelimiterSet) -> Vec<StringSlice> {
    let mut tokens = Vec::new();
    let mut position: i32 = 0;
    let mut start: Option<usize> = None;

    for (idx, c) in text.char_indices() {
        if delimiters.is_delimiter(c) {
            if let Some(s) = start.take() {
                tokens.push(StringSlice::new(text, s as i32, (idx - s) as i32, position));
                position += 1;
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        tokens.push(StringSlice::new(
            text,
            s as i32,
            (text.len() - s) as i32,
            position,
        ));
    }
    tokens
}

/// Word tokens for coverage, as plain owned lowercase strings — the shape the
/// external `getWordTokensForCoverage` contract exposes.
pub fn get_word_tokens_for_coverage(text: &str, min_word_size: usize) -> Vec<String> {
    tokenize(text, min_word_size, &DelimiterSet::default())
        .into_iter()
        .map(|s| s.text(text).to_lowercase())
        .collect()
}

/// Deduplicate a token stream by lowercase content, preserving first
/// occurrence. Used for both query tokens (equality by
/// content) and document tokens (equality by content, first-occurrence
/// position retained).
pub fn dedup_by_content(host: &str, tokens: &[StringSlice]) -> Vec<StringSlice> {
    let mut seen: FxHashMap<String, ()> = FxHashMap::default();
    let mut out = Vec::with_capacity(tokens.len());
    for &tok in tokens {
        let lower = tok.text(host).to_lowercase();
        if seen.insert(lower, ()).is_none() {
            out.push(tok);
        }
    }
    out
}
