//! [`CoverageScorer`]: deriving [`CoverageFeatures`] from post-match state.

use smallvec::SmallVec;

use crate::config::CoverageSetup;
use crate::context::CoverageQueryContext;
use crate::fusion_signals::FusionSignals;
use crate::match_state::{MatchState, NO_MATCH};

/// Per-term float array, inlined up to 8 terms before spilling to the heap —
/// most queries have a handful of terms.
pub type TermFloats = SmallVec<[f32; 8]>;

/// Small, fixed deduction applied to `weightedCoverage` proportional to the
/// unmatched IDF mass.
const MISSING_IDF_DEDUCTION: f32 = 0.05;

/// Immutable coverage result for one `(query, document)` pair.
#[derive(Debug, Clone, Default)]
pub struct CoverageFeatures {
    /// 0-255 coverage byte.
    pub coverage_score: u8,
    /// Number of deduplicated query terms.
    pub terms_count: usize,
    /// Terms with any match (whole, joined, prefix, or fuzzy).
    pub terms_with_any_match: usize,
    /// Terms whose matched character credit reached their max.
    pub terms_fully_matched: usize,
    /// Terms matched by the whole-word matcher.
    pub terms_strict_matched: usize,
    /// Terms matched whole or by prefix/suffix (not fuzzy-only).
    pub terms_prefix_matched: usize,
    /// Minimum doc position among matched terms, or -1.
    pub first_match_index: i32,
    /// Sum of per-term Ci.
    pub sum_ci: f32,
    /// Total whole/joined/prefix/fuzzy word hits.
    pub word_hits: u32,
    /// Number of unique tokens in the candidate document.
    pub doc_token_count: u32,
    /// Longest run of consecutive query terms with contiguous doc positions.
    pub longest_prefix_run: usize,
    /// Length of that run when it ends at the last query term.
    pub suffix_prefix_run: usize,
    /// `maxDocPos - minDocPos + 1` over matched terms, 0 if none.
    pub phrase_span: i32,
    /// Strictly-matched terms strictly before the last query term.
    pub preceding_strict_count: usize,
    /// Whether the last query term matched via prefix/suffix.
    pub last_token_has_prefix: bool,
    /// Ci for the last query term.
    pub last_term_ci: f32,
    /// `sumCi / termsCount`, blended with the LCS ratio and an IDF-miss deduction.
    pub weighted_coverage: f32,
    /// Whether the last query term should be treated as an incomplete typeahead prefix.
    pub last_term_is_type_ahead: bool,
    /// IDF-weighted coverage ratio.
    pub idf_coverage: f32,
    /// Sum of per-term IDF.
    pub total_idf: f32,
    /// IDF mass contributed by unmatched terms.
    pub missing_idf: f32,
    /// Per-term IDF (copied from the query context for convenience).
    pub term_idf: TermFloats,
    /// Per-term Ci.
    pub term_ci: TermFloats,
    /// Precomputed lexical fusion signals.
    pub fusion: FusionSignals,
}

impl CoverageFeatures {
    /// Empty-query sentinel: `terms_count = 0`, `coverage_score = 0`.
    pub fn empty() -> Self {
        CoverageFeatures::default()
    }
}

/// Derive [`CoverageFeatures`] from post-match `state`, the prepared query
/// context, and the caller-supplied LCS length.
pub fn calculate_features(
    state: &MatchState,
    ctx: &CoverageQueryContext,
    setup: &CoverageSetup,
    lcs_sum: f32,
    doc_token_count: u32,
    fusion: FusionSignals,
) -> CoverageFeatures {
    let n = state.term_count();
    if n == 0 {
        return CoverageFeatures {
            fusion,
            ..CoverageFeatures::default()
        };
    }

    let terms_with_any_match = (0..n).filter(|&i| !state.q_active[i]).count();
    let terms_strict_matched = (0..n).filter(|&i| state.term_has_whole[i]).count();
    let terms_prefix_matched = (0..n)
        .filter(|&i| state.term_has_whole[i] || state.term_has_prefix[i])
        .count();
    let terms_fully_matched = (0..n)
        .filter(|&i| state.term_matched_chars[i] >= ctx.term_max_chars[i] as f32)
        .count();

    let first_match_index = (0..n)
        .filter(|&i| state.term_first_pos[i] != NO_MATCH)
        .map(|i| state.term_first_pos[i])
        .min()
        .unwrap_or(NO_MATCH);

    // Per-term Ci, fixed ascending summation order for bit-reproducibility.
    let term_ci: TermFloats = (0..n)
        .map(|i| (state.term_matched_chars[i] / ctx.term_max_chars[i] as f32).min(1.0))
        .collect();
    let sum_ci: f32 = term_ci.iter().sum();
    let last = n - 1;
    let last_term_ci = term_ci[last];

    let term_idf: TermFloats = ctx.term_idf.iter().copied().collect();
    let total_idf: f32 = term_idf.iter().sum();
    let idf_coverage = if total_idf > 0.0 {
        (0..n).map(|i| term_ci[i] * term_idf[i]).sum::<f32>() / total_idf
    } else {
        0.0
    };
    let missing_idf: f32 = (0..n).map(|i| (1.0 - term_ci[i]) * term_idf[i]).sum();

    let (longest_prefix_run, suffix_prefix_run, phrase_span) = phrase_runs(state, n);

    let preceding_strict_count = (0..last).filter(|&i| state.term_has_whole[i]).count();
    let last_token_has_prefix = state.term_has_prefix[last];
    let last_term_is_type_ahead = ctx.query_tokens[last].length < setup.levenshtein_max_word_size as i32
        && !state.term_has_whole[last];

    let query_len = ctx.query.chars().count().max(1) as f32;
    let base = if setup.cover_whole_query {
        0.6 * (sum_ci / n as f32) + 0.4 * (lcs_sum / query_len)
    } else {
        sum_ci / n as f32
    };
    let deduction = if total_idf > 0.0 {
        MISSING_IDF_DEDUCTION * (missing_idf / total_idf)
    } else {
        0.0
    };
    let weighted_coverage = (base - deduction).clamp(0.0, 1.0);
    let coverage_score = (255.0 * weighted_coverage).round().clamp(0.0, 255.0) as u8;

    CoverageFeatures {
        coverage_score,
        terms_count: n,
        terms_with_any_match,
        terms_fully_matched,
        terms_strict_matched,
        terms_prefix_matched,
        first_match_index,
        sum_ci,
        word_hits: state.word_hits,
        doc_token_count,
        longest_prefix_run,
        suffix_prefix_run,
        phrase_span,
        preceding_strict_count,
        last_token_has_prefix,
        last_term_ci,
        weighted_coverage,
        last_term_is_type_ahead,
        idf_coverage,
        total_idf,
        missing_idf,
        term_idf,
        term_ci,
        fusion,
    }
}

/// Computes `(longest_prefix_run, suffix_prefix_run, phrase_span)` over the
/// doc positions assigned to matched terms, in query order.
fn phrase_runs(state: &MatchState, n: usize) -> (usize, usize, i32) {
    let mut longest = 0usize;
    let mut current = 0usize;
    let mut ending_at_last = 0usize;

    let mut min_pos = i32::MAX;
    let mut max_pos = i32::MIN;
    let mut any_matched = false;

    for i in 0..n {
        let pos = state.term_first_pos[i];
        if pos == NO_MATCH {
            current = 0;
            continue;
        }
        any_matched = true;
        min_pos = min_pos.min(pos);
        max_pos = max_pos.max(pos);

        if i > 0 && state.term_first_pos[i - 1] != NO_MATCH && pos == state.term_first_pos[i - 1] + 1 {
            current += 1;
        } else {
            current = 1;
        }
        longest = longest.max(current);
        if i == n - 1 {
            ending_at_last = current;
        }
    }

    let phrase_span = if any_matched { max_pos - min_pos + 1 } else { 0 };
    (longest, ending_at_last, phrase_span)
}
