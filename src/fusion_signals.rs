//! [`FusionSignalComputer`]: lexical-only signals over unfiltered tokens.
//!
//! Runs independently of the matcher cascade, over **unfiltered** token
//! streams (no min-word-size cutoff), so it can be computed before or
//! alongside [`crate::coverage::calculate_features`].

use crate::config::CoverageSetup;
use crate::edit_distance::damerau_levenshtein_ci;
use crate::external::DocumentMetadata;
use crate::token::{slices_equal_ci, StringSlice};
use crate::tokenizer::tokenize_unfiltered;

/// Precomputed lexical signals feeding the [`crate::fusion`] precedence and
/// semantic byte calculations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FusionSignals {
    /// All but the last query token match a doc token strictly, in
    /// increasing position order, and the last is a prefix of a later token.
    pub lexical_prefix_last: bool,
    /// The doc's token sequence equals the query's, modulo the last being a prefix.
    pub is_perfect_doc_lexical: bool,
    /// Some query term of length ≥ `anchor_stem_length` is a prefix of a doc token.
    pub has_anchor_stem: bool,
    /// At least one unmatched query term shares a ≥3-char prefix with a doc token.
    pub has_stem_evidence: bool,
    /// Count of tokens produced without the min-word-size filter.
    pub unfiltered_query_token_count: u32,
    /// Single-term-query similarity byte (0-255) against the best doc token.
    pub single_term_lexical_sim: u8,
    /// Byte (0-255) measuring trailing short query tokens found near the doc's end.
    pub trailing_match_density: u8,
}

/// Compute [`FusionSignals`] for one `(query, document)` pair.
pub fn compute_fusion_signals(
    query: &str,
    doc: &str,
    setup: &CoverageSetup,
    doc_metadata: Option<&DocumentMetadata>,
) -> FusionSignals {
    let q_tokens = tokenize_unfiltered(query, &setup.delimiters);
    let d_tokens = tokenize_unfiltered(doc, &setup.delimiters);

    let unfiltered_query_token_count = q_tokens.len() as u32;
    if q_tokens.is_empty() {
        return FusionSignals {
            unfiltered_query_token_count,
            ..FusionSignals::default()
        };
    }

    let lexical_prefix_last = lexical_prefix_last(query, doc, &q_tokens, &d_tokens);
    let is_perfect_doc_lexical = is_perfect_doc_lexical(query, doc, &q_tokens, &d_tokens);
    let has_anchor_stem = has_anchor_stem(query, doc, &q_tokens, &d_tokens, setup.anchor_stem_length);
    let has_stem_evidence = has_stem_evidence(query, doc, &q_tokens, &d_tokens);
    let single_term_lexical_sim = if q_tokens.len() <= 1 {
        single_term_lexical_sim(query, doc, &q_tokens, &d_tokens)
    } else {
        0
    };
    let trailing_match_density = trailing_match_density(query, doc, &q_tokens, &d_tokens, setup, doc_metadata);

    FusionSignals {
        lexical_prefix_last,
        is_perfect_doc_lexical,
        has_anchor_stem,
        has_stem_evidence,
        unfiltered_query_token_count,
        single_term_lexical_sim,
        trailing_match_density,
    }
}

/// Greedily assigns strictly-increasing doc positions to query tokens
/// `0..n-1` by exact case-insensitive equality; returns the assigned
/// positions, or `None` if some token could not be matched in order.
fn greedy_increasing_matches(
    query: &str,
    doc: &str,
    q_tokens: &[StringSlice],
    d_tokens: &[StringSlice],
    up_to: usize,
) -> Option<i32> {
    let mut cursor = -1i32;
    for qt in &q_tokens[..up_to] {
        let qt_text = qt.text(query);
        let found = d_tokens
            .iter()
            .find(|dt| dt.position > cursor && dt.text(doc).eq_ignore_ascii_case(qt_text));
        cursor = found?.position;
    }
    Some(cursor)
}

fn lexical_prefix_last(
    query: &str,
    doc: &str,
    q_tokens: &[StringSlice],
    d_tokens: &[StringSlice],
) -> bool {
    let n = q_tokens.len();
    let last = match greedy_increasing_matches(query, doc, q_tokens, d_tokens, n - 1) {
        Some(c) => c,
        None => return false,
    };
    let last_text = q_tokens[n - 1].text(query);
    d_tokens
        .iter()
        .any(|dt| dt.position > last && dt.text(doc).to_lowercase().starts_with(&last_text.to_lowercase()))
}

fn is_perfect_doc_lexical(
    query: &str,
    doc: &str,
    q_tokens: &[StringSlice],
    d_tokens: &[StringSlice],
) -> bool {
    if q_tokens.len() != d_tokens.len() || q_tokens.is_empty() {
        return false;
    }
    let n = q_tokens.len();
    let all_but_last_equal =
        (0..n - 1).all(|i| slices_equal_ci(&q_tokens[i], query, &d_tokens[i], doc));
    let last_is_prefix = d_tokens[n - 1]
        .text(doc)
        .to_lowercase()
        .starts_with(&q_tokens[n - 1].text(query).to_lowercase());
    all_but_last_equal && last_is_prefix
}

fn has_anchor_stem(
    query: &str,
    doc: &str,
    q_tokens: &[StringSlice],
    d_tokens: &[StringSlice],
    anchor_stem_length: usize,
) -> bool {
    q_tokens.iter().any(|qt| {
        qt.length as usize >= anchor_stem_length
            && d_tokens.iter().any(|dt| {
                dt.text(doc)
                    .to_lowercase()
                    .starts_with(&qt.text(query).to_lowercase())
            })
    })
}

fn has_stem_evidence(
    query: &str,
    doc: &str,
    q_tokens: &[StringSlice],
    d_tokens: &[StringSlice],
) -> bool {
    q_tokens.iter().any(|qt| {
        let qt_text = qt.text(query).to_lowercase();
        let exactly_matched = d_tokens
            .iter()
            .any(|dt| dt.text(doc).eq_ignore_ascii_case(&qt_text));
        if exactly_matched {
            return false;
        }
        let stem_len = 3.min(qt_text.chars().count());
        if stem_len == 0 {
            return false;
        }
        let qt_stem: String = qt_text.chars().take(stem_len).collect();
        d_tokens.iter().any(|dt| {
            let dt_text = dt.text(doc).to_lowercase();
            dt_text.chars().count() >= stem_len && dt_text.starts_with(&qt_stem)
        })
    })
}

fn single_term_lexical_sim(
    query: &str,
    doc: &str,
    q_tokens: &[StringSlice],
    d_tokens: &[StringSlice],
) -> u8 {
    let Some(qt) = q_tokens.first() else {
        return 0;
    };
    let qt_text = qt.text(query);
    let best = d_tokens
        .iter()
        .map(|dt| {
            let dt_text = dt.text(doc);
            let dist = damerau_levenshtein_ci(qt_text, dt_text) as f32;
            let max_len = (qt_text.chars().count().max(dt_text.chars().count())).max(1) as f32;
            1.0 - (dist / max_len)
        })
        .fold(0.0f32, f32::max);
    (255.0 * best.clamp(0.0, 1.0)).round() as u8
}

fn trailing_match_density(
    query: &str,
    doc: &str,
    q_tokens: &[StringSlice],
    d_tokens: &[StringSlice],
    setup: &CoverageSetup,
    doc_metadata: Option<&DocumentMetadata>,
) -> u8 {
    let threshold = setup.max_trailing_term_length_for_bonus as i32;
    let trailing: Vec<&StringSlice> = q_tokens
        .iter()
        .rev()
        .take_while(|t| t.length <= threshold)
        .collect();
    if trailing.is_empty() {
        return 0;
    }

    let window_size = (trailing.len() * 2 + 2).min(d_tokens.len());
    let window = &d_tokens[d_tokens.len() - window_size..];

    let mut matched = 0usize;
    for (idx, qt) in trailing.iter().enumerate() {
        let qt_text = qt.text(query);
        let hit = window.iter().any(|dt| dt.text(doc).eq_ignore_ascii_case(qt_text))
            || (idx == 0
                && doc_metadata
                    .map(|m| m.last_token_hash == qt.hash)
                    .unwrap_or(false));
        if hit {
            matched += 1;
        }
    }

    (255.0 * (matched as f32 / trailing.len() as f32)).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_has_no_signals() {
        let setup = CoverageSetup::default();
        let sig = compute_fusion_signals("", "anything here", &setup, None);
        assert_eq!(sig.unfiltered_query_token_count, 0);
        assert!(!sig.lexical_prefix_last);
    }

    #[test]
    fn lexical_prefix_last_detects_trailing_prefix_match() {
        let setup = CoverageSetup::default();
        let a = compute_fusion_signals("the matrix rev", "The Matrix Reloaded", &setup, None);
        let b = compute_fusion_signals("the matrix rev", "The Matrix Revisited", &setup, None);
        assert!(!a.lexical_prefix_last);
        assert!(b.lexical_prefix_last);
    }

    #[test]
    fn is_perfect_doc_lexical_true_for_same_length_prefix_match() {
        let setup = CoverageSetup::default();
        let sig = compute_fusion_signals("the matrix rev", "the matrix revisited", &setup, None);
        assert!(sig.is_perfect_doc_lexical);
    }

    #[test]
    fn has_anchor_stem_true_when_prefix_present() {
        let setup = CoverageSetup::default();
        let sig = compute_fusion_signals("bat", "batman superman", &setup, None);
        assert!(sig.has_anchor_stem);
    }

    #[test]
    fn single_term_lexical_sim_near_max_for_near_identical_terms() {
        let setup = CoverageSetup::default();
        let sig = compute_fusion_signals("batmam", "batman is here", &setup, None);
        assert!(sig.single_term_lexical_sim > 200);
    }

    #[test]
    fn trailing_match_density_zero_without_short_trailing_terms() {
        let setup = CoverageSetup::default();
        let sig = compute_fusion_signals("matrix reloaded", "the matrix reloaded", &setup, None);
        assert_eq!(sig.trailing_match_density, 0);
    }

    #[test]
    fn trailing_match_density_detects_short_trailing_terms_near_end() {
        let setup = CoverageSetup::default();
        let sig = compute_fusion_signals("two fo", "tea for two", &setup, None);
        assert!(sig.trailing_match_density > 0);
    }
}
