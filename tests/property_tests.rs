//! Property tests for invariants that must hold across every query/document
//! pair, regardless of the specific matcher or fusion outcome.

use proptest::prelude::*;

use lexical_coverage::config::CoverageSetup;
use lexical_coverage::engine::CoverageEngine;
use lexical_coverage::fusion;
use lexical_coverage::score_array::ScoreArray;

fn ascii_word() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,12}"
}

fn ascii_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(ascii_word(), 0..6).prop_map(|words| words.join(" "))
}

proptest! {
    /// 1. coverageScore and semantic are always within [0, 255].
    #[test]
    fn coverage_and_semantic_bytes_stay_in_range(query in ascii_text(), doc in ascii_text()) {
        let setup = CoverageSetup::default();
        let engine = CoverageEngine::new(setup.clone()).unwrap();
        let features = engine.calculate_features(&query, &doc, 0.0, 1);
        prop_assert!(features.coverage_score <= 255);

        let (score, _) = fusion::calculate(&features, 0.0, query.len(), doc.len(), &setup);
        let semantic = (score & 0xFF) as u8;
        prop_assert!(semantic <= 255);
    }

    /// 2. termsStrictMatched <= termsPrefixMatched <= termsWithAnyMatch <= termsCount.
    #[test]
    fn match_tier_counts_are_monotonic(query in ascii_text(), doc in ascii_text()) {
        let engine = CoverageEngine::new(CoverageSetup::default()).unwrap();
        let features = engine.calculate_features(&query, &doc, 0.0, 1);
        prop_assert!(features.terms_strict_matched <= features.terms_prefix_matched);
        prop_assert!(features.terms_prefix_matched <= features.terms_with_any_match);
        prop_assert!(features.terms_with_any_match <= features.terms_count);
    }

    /// 3. Adding the same entry twice yields count == 2 and both surface in get_top_k.
    #[test]
    fn duplicate_score_array_entries_both_surface(doc_id in 1i64..1000, score in 0u16..=65535, tiebreaker in 0u8..=255) {
        let mut scores = ScoreArray::new();
        scores.add(doc_id, score, tiebreaker);
        scores.add(doc_id, score, tiebreaker);
        prop_assert_eq!(scores.count(), 2);
        prop_assert_eq!(scores.get_top_k(10).len(), 2);
    }

    /// 4. get_top_k(k) is a prefix of the descending ordering of get_all().
    #[test]
    fn top_k_is_prefix_of_full_ordering(
        entries in proptest::collection::vec((1i64..1000, 0u16..=65535, 0u8..=255), 0..40),
        k in 0usize..20,
    ) {
        let mut scores = ScoreArray::new();
        for (doc_id, score, tiebreaker) in &entries {
            scores.add(*doc_id, *score, *tiebreaker);
        }
        let all = scores.get_all();
        let top_k = scores.get_top_k(k);
        prop_assert_eq!(top_k.len(), k.min(all.len()));
        prop_assert_eq!(top_k.as_slice(), &all[..top_k.len()]);
    }

    /// 5. Tokenizer deduplication is idempotent.
    #[test]
    fn dedup_by_content_is_idempotent(text in ascii_text()) {
        use lexical_coverage::config::DelimiterSet;
        use lexical_coverage::tokenizer::{dedup_by_content, tokenize};

        let delims = DelimiterSet::default();
        let tokens = tokenize(&text, 2, &delims);
        let once = dedup_by_content(&text, &tokens);
        let twice = dedup_by_content(&text, &once);
        let once_text: Vec<&str> = once.iter().map(|t| t.text(&text)).collect();
        let twice_text: Vec<&str> = twice.iter().map(|t| t.text(&text)).collect();
        prop_assert_eq!(once_text, twice_text);
    }

    /// 6. Normalizer is a no-op on already-normalized ASCII text with single spaces.
    #[test]
    fn normalizer_is_identity_on_normalized_ascii(text in "[a-zA-Z]{1,10}( [a-zA-Z]{1,10}){0,5}") {
        use lexical_coverage::normalize::normalize;
        use std::borrow::Cow;

        match normalize(&text) {
            Cow::Borrowed(s) => prop_assert_eq!(s, text.as_str()),
            Cow::Owned(s) => prop_assert_eq!(s, text),
        }
    }

    /// 7. FusionScorer.calculate is deterministic in its inputs.
    #[test]
    fn fusion_calculate_is_deterministic(query in ascii_text(), doc in ascii_text(), bm25 in 0.0f32..2.0) {
        let setup = CoverageSetup::default();
        let engine = CoverageEngine::new(setup.clone()).unwrap();
        let features_a = engine.calculate_features(&query, &doc, 0.0, 1);
        let features_b = engine.calculate_features(&query, &doc, 0.0, 1);
        let result_a = fusion::calculate(&features_a, bm25, query.len(), doc.len(), &setup);
        let result_b = fusion::calculate(&features_b, bm25, query.len(), doc.len(), &setup);
        prop_assert_eq!(result_a, result_b);
    }
}

/// 8. Componentwise dominance on (termsWithAnyMatch, termsStrictMatched,
/// -firstMatchIndex, longestPrefixRun) implies score1 >= score2.
#[test]
fn componentwise_dominance_implies_score_dominance() {
    let setup = CoverageSetup::default();
    let engine = CoverageEngine::new(setup.clone()).unwrap();
    let query = "the matrix reloaded";

    // doc1 matches every term strictly, at the start, with a full contiguous run.
    let doc1 = "the matrix reloaded today";
    // doc2 matches fewer terms, later, with no contiguous run.
    let doc2 = "reloaded somewhere the matrix is elsewhere";

    let features1 = engine.calculate_features(query, doc1, 0.0, 1);
    let features2 = engine.calculate_features(query, doc2, 0.0, 2);

    let dominates = features1.terms_with_any_match >= features2.terms_with_any_match
        && features1.terms_strict_matched >= features2.terms_strict_matched
        && (-features1.first_match_index) >= (-features2.first_match_index)
        && features1.longest_prefix_run >= features2.longest_prefix_run;
    assert!(dominates, "doc1 is constructed to dominate doc2 on every axis");

    let (score1, _) = fusion::calculate(&features1, 0.0, query.len(), doc1.len(), &setup);
    let (score2, _) = fusion::calculate(&features2, 0.0, query.len(), doc2.len(), &setup);
    assert!(score1 >= score2, "dominating doc should score at least as high: {score1} vs {score2}");
}
