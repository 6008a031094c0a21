//! [`FusionScorer`]: packed ranking key.
//!
//! Produces `(score, tiebreaker)` where `score = (precedence << 8) | semantic`.
//! Both halves are pure functions of [`crate::coverage::CoverageFeatures`] and
//! an externally-supplied BM25 score — no re-tokenization here.

use crate::config::CoverageSetup;
use crate::coverage::CoverageFeatures;

/// Computes the packed `(score, tiebreaker)` ranking key for one candidate.
///
/// `query_len`/`doc_len` are char counts of the original query/document text,
/// used only for the tiebreaker.
pub fn calculate(
    features: &CoverageFeatures,
    bm25_score: f32,
    query_len: usize,
    doc_len: usize,
    setup: &CoverageSetup,
) -> (u16, u8) {
    if features.terms_count == 0 {
        return (0, 0);
    }

    let n = features.fusion.unfiltered_query_token_count.max(features.terms_count as u32) as usize;
    let is_single_term = n <= 1;
    let terms_count = features.terms_count;

    let is_complete = features.terms_with_any_match == terms_count;
    let is_clean = features.terms_prefix_matched == terms_count;
    let is_exact = features.terms_strict_matched == terms_count;
    let starts_at_beginning = features.first_match_index == 0;
    let coverage_prefix_last =
        features.preceding_strict_count == terms_count.saturating_sub(1) && features.last_token_has_prefix;
    let is_prefix_last_strong = features.fusion.lexical_prefix_last && coverage_prefix_last;
    let is_exact_prefix = !is_single_term
        && is_clean
        && starts_at_beginning
        && features.fusion.lexical_prefix_last
        && is_complete;

    let mut precedence: u8 = 0;
    if is_complete {
        precedence |= 128;
    }
    if is_clean {
        precedence |= 64;
    }
    if is_exact_prefix {
        precedence |= 32;
    }

    let coverage_ratio = if terms_count > 0 {
        features.terms_with_any_match as f32 / terms_count as f32
    } else {
        0.0
    };
    let has_partial_coverage = coverage_ratio > 0.0 && coverage_ratio < 1.0 && n >= 2;

    if is_single_term {
        let tier = single_term_tier(is_complete, starts_at_beginning, is_exact, is_clean);
        precedence |= tier << 3;
    } else {
        let tier = multi_term_tier(features, is_prefix_last_strong);
        precedence |= tier << 2;

        let phrase_bits = phrase_quality_bits(features, terms_count, n);
        precedence |= phrase_bits;
    }

    if has_partial_coverage {
        if features.fusion.has_stem_evidence {
            precedence |= 128;
        } else {
            let exactly_one_missing = terms_count - features.terms_with_any_match == 1;
            let forgivable = features.last_token_has_prefix
                || features.terms_with_any_match == terms_count
                || !features.last_term_is_type_ahead;
            if exactly_one_missing && forgivable && features.total_idf > 0.0 {
                let missing_info_ratio = features.missing_idf / features.total_idf;
                let term_gap = 1.0 - coverage_ratio;
                if missing_info_ratio < term_gap {
                    precedence |= 8;
                }
            }
        }
    }

    let semantic = semantic_byte(
        features,
        bm25_score,
        coverage_ratio,
        has_partial_coverage,
        terms_count,
        setup,
    );
    let score = ((precedence as u16) << 8) | semantic as u16;

    let tiebreaker = if n >= 2 && doc_len > 0 {
        (255.0 * (query_len as f32 / doc_len as f32).min(1.0)).round() as u8
    } else {
        0
    };

    (score, tiebreaker)
}

fn single_term_tier(is_complete: bool, starts_at_beginning: bool, is_exact: bool, is_clean: bool) -> u8 {
    if is_complete && starts_at_beginning && is_exact {
        4
    } else if is_complete && starts_at_beginning && is_clean {
        3
    } else if is_complete && !starts_at_beginning && is_exact {
        2
    } else if is_complete && !starts_at_beginning && is_clean {
        1
    } else {
        0
    }
}

fn multi_term_tier(features: &CoverageFeatures, is_prefix_last_strong: bool) -> u8 {
    let has_anchor_with_run = features.fusion.has_anchor_stem && features.longest_prefix_run >= 2;
    if is_prefix_last_strong {
        3
    } else if features.fusion.lexical_prefix_last {
        2
    } else if features.fusion.is_perfect_doc_lexical || has_anchor_with_run {
        1
    } else {
        0
    }
}

fn phrase_quality_bits(features: &CoverageFeatures, terms_count: usize, n: usize) -> u8 {
    let mut bits: u8 = 0;
    let strong_run_threshold = 2usize.max(terms_count.min(n).saturating_sub(1));
    if features.suffix_prefix_run >= strong_run_threshold {
        bits |= 8;
    } else if features.suffix_prefix_run >= 2 {
        bits |= 4;
    }
    if features.longest_prefix_run >= 3 {
        bits |= 2;
    }
    if features.terms_with_any_match >= 2 && features.phrase_span == 2 {
        bits |= 1;
    }
    bits
}

fn semantic_byte(
    features: &CoverageFeatures,
    bm25_score: f32,
    coverage_ratio: f32,
    has_partial_coverage: bool,
    terms_count: usize,
    setup: &CoverageSetup,
) -> u8 {
    let avg_ci = features.sum_ci / terms_count.max(1) as f32;

    let mut semantic = if terms_count <= 1 {
        (avg_ci + features.fusion.single_term_lexical_sim as f32 / 255.0) / 2.0
    } else if features.doc_token_count == 0 {
        avg_ci
    } else {
        let one_missing = terms_count - features.terms_with_any_match == 1;
        let idf_use_permitted = features.total_idf > 0.0;
        let base_coverage = if has_partial_coverage
            && one_missing
            && idf_use_permitted
            && features.idf_coverage > coverage_ratio
        {
            features.idf_coverage
        } else {
            avg_ci
        };
        let mut s = base_coverage * (features.word_hits as f32 / features.doc_token_count as f32);

        if terms_count >= 3 {
            let bonus = setup.intent_bonus_per_signal
                * ((features.fusion.has_anchor_stem as u8 as f32)
                    + (features.suffix_prefix_run >= 2) as u8 as f32);
            s = (s + bonus.min(1.0)).min(1.0);
        }
        if terms_count >= 2 {
            s += (1.0 - s) * (features.fusion.trailing_match_density as f32 / 255.0);
        }
        s
    };

    semantic = semantic.clamp(0.0, 1.0);

    if has_partial_coverage && bm25_score >= (1.0 - coverage_ratio) {
        semantic = coverage_ratio * semantic + (1.0 - coverage_ratio) * bm25_score;
    }

    (255.0 * semantic.clamp(0.0, 1.0)).round() as u8
}
