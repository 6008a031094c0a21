//! Coverage/fusion configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};

/// Hard upper cap on `levenshtein_max_word_size`, independent of configuration.
pub const LEVENSHTEIN_HARD_CAP: usize = 63;

/// Delimiter set used to split the query/document token streams.
///
/// Defaults to "anything that isn't alphanumeric", matching the external
/// tokenizer contract's default delimiter behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelimiterSet {
    extra: HashSet<char>,
}

impl DelimiterSet {
    /// Delimiter set with no extra delimiters beyond "non-alphanumeric".
    pub fn new() -> Self {
        DelimiterSet {
            extra: HashSet::new(),
        }
    }

    /// Add a character to the delimiter set (on top of non-alphanumeric).
    pub fn with_delimiter(mut self, c: char) -> Self {
        self.extra.insert(c);
        self
    }

    /// Whether `c` splits a token.
    pub fn is_delimiter(&self, c: char) -> bool {
        !c.is_alphanumeric() || self.extra.contains(&c)
    }
}

impl Default for DelimiterSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Enumerated configuration for the coverage/fusion core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageSetup {
    /// Minimum token length after filtering (default 2).
    pub min_word_size: usize,
    /// Enable the whole-word matcher.
    pub cover_whole_words: bool,
    /// Enable the joined-word matcher.
    pub cover_joined_words: bool,
    /// Enable the prefix/suffix matcher.
    pub cover_prefix_suffix: bool,
    /// Enable the fuzzy matcher.
    pub cover_fuzzy_words: bool,
    /// Blend the whole-query LCS ratio into the coverage byte.
    pub cover_whole_query: bool,
    /// Hard-capped at [`LEVENSHTEIN_HARD_CAP`].
    pub levenshtein_max_word_size: usize,
    /// Per-signal contribution of the fusion intent bonus (default 0.15).
    pub intent_bonus_per_signal: f32,
    /// Minimum token length to count as an anchor stem (default 3).
    pub anchor_stem_length: usize,
    /// Trailing query tokens at most this long count toward trailing density (default 2).
    pub max_trailing_term_length_for_bonus: usize,
    /// Delimiter set for tokenization.
    pub delimiters: DelimiterSet,
}

impl Default for CoverageSetup {
    fn default() -> Self {
        CoverageSetup {
            min_word_size: 2,
            cover_whole_words: true,
            cover_joined_words: true,
            cover_prefix_suffix: true,
            cover_fuzzy_words: true,
            cover_whole_query: true,
            levenshtein_max_word_size: LEVENSHTEIN_HARD_CAP,
            intent_bonus_per_signal: 0.15,
            anchor_stem_length: 3,
            max_trailing_term_length_for_bonus: 2,
            delimiters: DelimiterSet::default(),
        }
    }
}

impl CoverageSetup {
    /// Builder: set minimum word size.
    pub fn with_min_word_size(mut self, n: usize) -> Self {
        self.min_word_size = n;
        self
    }

    /// Builder: set the Levenshtein max word size (clamped to the hard cap on validate).
    pub fn with_levenshtein_max_word_size(mut self, n: usize) -> Self {
        self.levenshtein_max_word_size = n;
        self
    }

    /// Builder: set delimiters.
    pub fn with_delimiters(mut self, delimiters: DelimiterSet) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Builder: set the per-signal contribution of the fusion intent bonus.
    pub fn with_intent_bonus_per_signal(mut self, value: f32) -> Self {
        self.intent_bonus_per_signal = value;
        self
    }

    /// Validate and normalize the configuration.
    ///
    /// Enforces the hard cap on `levenshtein_max_word_size`; anything else is
    /// a programming error detected by `debug_assert!` at point of use rather
    /// than a recoverable `Error`.
    pub fn validate(&self) -> Result<()> {
        if self.levenshtein_max_word_size > LEVENSHTEIN_HARD_CAP {
            return Err(Error::InvalidSetup(format!(
                "levenshtein_max_word_size {} exceeds hard cap {}",
                self.levenshtein_max_word_size, LEVENSHTEIN_HARD_CAP
            )));
        }
        if self.min_word_size == 0 {
            return Err(Error::InvalidSetup(
                "min_word_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
