//! Segment consolidator.
//!
//! Documents are indexed per-segment; `consolidate_segments` collapses a
//! `ScoreArray` keyed by segment id down to one entry per logical document
//! key, keeping the best-scoring segment. `get_best_segment_text` and
//! `calculate_lcs` round out the `SegmentProcessor` entry points.

use rustc_hash::FxHashMap;

use crate::external::DocumentCollection;
use crate::normalize::normalize;
use crate::score_array::ScoreArray;

/// Winning `(document_key, segment_number)` per base document id, as produced
/// by [`consolidate_segments`] and consumed by [`get_best_segment_text`].
pub type BestSegments = FxHashMap<i64, (String, i32)>;

/// Collapse a segment-keyed `ScoreArray` into one entry per document key,
/// keeping the max `(score, tiebreaker)` (score dominates ties).
///
/// Segments whose public id no longer resolves to a document, or that
/// resolve to a soft-deleted document, are silently dropped.
pub fn consolidate_segments(
    scores: &ScoreArray,
    docs: &dyn DocumentCollection,
) -> (ScoreArray, BestSegments) {
    struct Winner {
        base_doc_id: i64,
        document_key: String,
        segment_number: i32,
        score: u16,
        tiebreaker: u8,
    }

    let mut winners: FxHashMap<String, Winner> = FxHashMap::default();

    for entry in scores.get_all() {
        let Some(doc) = docs.get_document_by_public_key(entry.doc_id) else {
            continue;
        };
        if doc.deleted {
            continue;
        }

        let better = match winners.get(&doc.document_key) {
            None => true,
            Some(w) => (entry.score, entry.tiebreaker) > (w.score, w.tiebreaker),
        };
        if better {
            winners.insert(
                doc.document_key.clone(),
                Winner {
                    base_doc_id: entry.doc_id,
                    document_key: doc.document_key,
                    segment_number: doc.segment_number,
                    score: entry.score,
                    tiebreaker: entry.tiebreaker,
                },
            );
        }
    }

    let mut consolidated = ScoreArray::new();
    let mut best_segments: BestSegments = FxHashMap::default();
    for winner in winners.into_values() {
        consolidated.add(winner.base_doc_id, winner.score, winner.tiebreaker);
        best_segments.insert(
            winner.base_doc_id,
            (winner.document_key, winner.segment_number),
        );
    }

    (consolidated, best_segments)
}

/// Fetch and normalize the winning segment's text for `base_doc_id`.
pub fn get_best_segment_text(
    base_doc_id: i64,
    best_segments: &BestSegments,
    docs: &dyn DocumentCollection,
) -> Option<String> {
    let (key, segment_number) = best_segments.get(&base_doc_id)?;
    let doc = docs.get_document_of_segment(key, *segment_number)?;
    Some(normalize(&doc.indexed_text).into_owned())
}

/// Length of the longest common subsequence between `query` and `doc`,
/// case-insensitive, used as the whole-query coverage boost input.
pub fn calculate_lcs(query: &str, doc: &str) -> usize {
    let a: Vec<char> = query.to_lowercase().chars().collect();
    let b: Vec<char> = doc.to_lowercase().chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in &a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::Document;

    struct FakeDocs {
        docs: Vec<Document>,
    }
    impl DocumentCollection for FakeDocs {
        fn get_document_by_public_key(&self, id: i64) -> Option<Document> {
            self.docs.iter().find(|d| d.id == id).cloned()
        }
        fn get_documents_for_public_key(&self, key: &str) -> Vec<Document> {
            self.docs.iter().filter(|d| d.document_key == key).cloned().collect()
        }
        fn get_document_of_segment(&self, key: &str, segment_number: i32) -> Option<Document> {
            self.docs
                .iter()
                .find(|d| d.document_key == key && d.segment_number == segment_number)
                .cloned()
        }
    }

    fn doc(id: i64, key: &str, segment: i32, text: &str) -> Document {
        Document {
            indexed_text: text.to_string(),
            deleted: false,
            id,
            segment_number: segment,
            document_key: key.to_string(),
        }
    }

    #[test]
    fn keeps_best_scoring_segment_per_document() {
        let docs = FakeDocs {
            docs: vec![doc(1, "k1", 0, "first segment"), doc(2, "k1", 1, "second segment")],
        };
        let mut scores = ScoreArray::new();
        scores.add(1, 100, 0);
        scores.add(2, 200, 0);

        let (consolidated, best) = consolidate_segments(&scores, &docs);
        let all = consolidated.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].doc_id, 2);
        assert_eq!(best.get(&2).unwrap().1, 1);
    }

    #[test]
    fn deleted_segments_are_dropped() {
        let mut d = doc(1, "k1", 0, "text");
        d.deleted = true;
        let docs = FakeDocs { docs: vec![d] };
        let mut scores = ScoreArray::new();
        scores.add(1, 100, 0);

        let (consolidated, _) = consolidate_segments(&scores, &docs);
        assert_eq!(consolidated.count(), 0);
    }

    #[test]
    fn get_best_segment_text_normalizes_result() {
        let docs = FakeDocs {
            docs: vec![doc(1, "k1", 0, "a   b")],
        };
        let mut best = BestSegments::default();
        best.insert(1, ("k1".to_string(), 0));
        let text = get_best_segment_text(1, &best, &docs).unwrap();
        assert_eq!(text, "a b");
    }

    #[test]
    fn lcs_of_identical_strings_is_full_length() {
        assert_eq!(calculate_lcs("matrix", "matrix"), 6);
    }

    #[test]
    fn lcs_of_disjoint_strings_is_zero() {
        assert_eq!(calculate_lcs("abc", "xyz"), 0);
    }

    #[test]
    fn lcs_is_case_insensitive() {
        assert_eq!(calculate_lcs("ABC", "abc"), 3);
    }
}
