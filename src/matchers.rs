//! Matcher cascade.
//!
//! All four matchers share one [`MatchState`], claiming disjoint `(i, j)`
//! query/doc token pairs as they fire. Order is significant: each later
//! matcher only ever sees entries still active after the earlier passes.
//! Within one pass, query tokens are visited in index order and, for each,
//! doc tokens in position order — first match wins.

use crate::config::{CoverageSetup, LEVENSHTEIN_HARD_CAP};
use crate::edit_distance::damerau_levenshtein_ci;
use crate::match_state::MatchState;

/// Whole-word matcher: identical lowercase content.
pub fn whole_word_matcher(state: &mut MatchState, query: &str, doc: &str) {
    let mut claims = 0usize;
    for i in 0..state.term_count() {
        if !state.q_active[i] {
            continue;
        }
        let qi = state.query_tokens[i];
        let qi_text = qi.text(query);
        let found = (0..state.doc_tokens.len()).find(|&j| {
            state.d_active[j] && qi_text.eq_ignore_ascii_case(state.doc_tokens[j].text(doc))
        });

        if let Some(j) = found {
            let dj = state.doc_tokens[j];
            state.claim(i, j);
            state.term_has_whole[i] = true;
            state.term_matched_chars[i] += qi.length as f32;
            state.record_position(i, dj.position);
            state.word_hits += 1;
            claims += 1;
        }
    }
    tracing::trace!(claims, "whole_word_matcher pass complete");
}

/// Joined-word matcher: a query token equal to the
/// concatenation of two adjacent doc tokens, or vice versa.
pub fn joined_word_matcher(state: &mut MatchState, query: &str, doc: &str) {
    let mut claims = 0usize;

    // Direction A: one query token == two adjacent doc tokens joined.
    for i in 0..state.term_count() {
        if !state.q_active[i] {
            continue;
        }
        let qi = state.query_tokens[i];
        let qi_text = qi.text(query).to_lowercase();
        let doc_len = state.doc_tokens.len();
        let found = (0..doc_len.saturating_sub(1)).find(|&j| {
            state.d_active[j]
                && state.d_active[j + 1]
                && joined_matches(
                    state.doc_tokens[j].text(doc),
                    state.doc_tokens[j + 1].text(doc),
                    &qi_text,
                )
        });

        if let Some(j) = found {
            let pos = state.doc_tokens[j].position;
            state.claim(i, j);
            state.d_active[j + 1] = false;
            state.term_has_joined[i] = true;
            state.term_matched_chars[i] += qi.length as f32;
            state.record_position(i, pos);
            state.word_hits += 1;
            claims += 1;
        }
    }

    // Direction B: two adjacent query tokens == one doc token joined.
    let n = state.term_count();
    for i in 0..n.saturating_sub(1) {
        if !state.q_active[i] || !state.q_active[i + 1] {
            continue;
        }
        let qi = state.query_tokens[i];
        let qi1 = state.query_tokens[i + 1];
        let joined = format!("{}{}", qi.text(query), qi1.text(query)).to_lowercase();
        let found = (0..state.doc_tokens.len())
            .find(|&j| state.d_active[j] && state.doc_tokens[j].text(doc).eq_ignore_ascii_case(&joined));

        if let Some(j) = found {
            let pos = state.doc_tokens[j].position;
            state.claim(i, j);
            state.q_active[i + 1] = false;
            state.term_has_joined[i] = true;
            state.term_has_joined[i + 1] = true;
            state.term_matched_chars[i] += qi.length as f32;
            state.term_matched_chars[i + 1] += qi1.length as f32;
            state.record_position(i, pos);
            state.record_position(i + 1, pos);
            state.word_hits += 1;
            claims += 1;
        }
    }

    tracing::trace!(claims, "joined_word_matcher pass complete");
}

fn joined_matches(first: &str, second: &str, target: &str) -> bool {
    first.len() + second.len() == target.len()
        && target.eq_ignore_ascii_case(&format!("{first}{second}"))
}

/// Prefix/suffix matcher: one token is a prefix (or
/// suffix) of the other, in either direction.
pub fn prefix_suffix_matcher(state: &mut MatchState, query: &str, doc: &str) {
    let mut claims = 0usize;
    for i in 0..state.term_count() {
        if !state.q_active[i] {
            continue;
        }
        let qi = state.query_tokens[i];
        let qi_text = qi.text(query).to_lowercase();
        let found = (0..state.doc_tokens.len()).find(|&j| {
            state.d_active[j]
                && is_prefix_or_suffix(&qi_text, &state.doc_tokens[j].text(doc).to_lowercase())
        });

        if let Some(j) = found {
            let dj = state.doc_tokens[j];
            let credit = qi.length.min(dj.length) as f32;
            state.claim(i, j);
            state.term_has_prefix[i] = true;
            state.term_matched_chars[i] += credit;
            state.record_position(i, dj.position);
            state.word_hits += 1;
            claims += 1;
        }
    }
    tracing::trace!(claims, "prefix_suffix_matcher pass complete");
}

fn is_prefix_or_suffix(a: &str, b: &str) -> bool {
    a.starts_with(b) || b.starts_with(a) || a.ends_with(b) || b.ends_with(a)
}

/// Fuzzy matcher: Damerau-Levenshtein with a growing
/// edit budget, skipped entirely once every term is already fully matched.
pub fn fuzzy_word_matcher(state: &mut MatchState, query: &str, doc: &str, setup: &CoverageSetup) {
    if state.all_terms_fully_matched() {
        tracing::trace!(claims = 0, "fuzzy_word_matcher pass complete (all terms matched)");
        return;
    }

    let max_active_q_len = (0..state.term_count())
        .filter(|&i| state.q_active[i])
        .map(|i| state.query_tokens[i].length)
        .max();
    let Some(max_active_q_len) = max_active_q_len else {
        tracing::trace!(claims = 0, "fuzzy_word_matcher pass complete (no active terms)");
        return;
    };
    let max_edit_dist = 1.max(((max_active_q_len as f32) * 0.25).round() as i32);
    let lev_cap = (setup.levenshtein_max_word_size as i32).min(LEVENSHTEIN_HARD_CAP as i32);
    let mut claims = 0usize;

    for ed in 1..=max_edit_dist {
        for i in 0..state.term_count() {
            if !state.q_active[i] {
                continue;
            }
            let qi = state.query_tokens[i];
            let q_len = qi.length;
            let lo = (setup.min_word_size as i32 + 1).max(q_len - ed);
            let hi = lev_cap.min(q_len + ed);
            let qi_text = qi.text(query).to_lowercase();

            let found = (0..state.doc_tokens.len()).find_map(|j| {
                if !state.d_active[j] {
                    return None;
                }
                let dj = state.doc_tokens[j];
                if dj.length < lo || dj.length > hi {
                    return None;
                }
                let dist = damerau_levenshtein_ci(&qi_text, dj.text(doc)) as i32;
                (dist <= ed).then_some((j, dist))
            });

            if let Some((j, dist)) = found {
                let dj = state.doc_tokens[j];
                state.claim(i, j);
                state.word_hits += 1;
                let credit = (q_len - dist).max(0);
                state.num_fuzzy += credit as u32;
                state.term_matched_chars[i] += credit as f32;
                state.record_position(i, dj.position);
                claims += 1;
            }
        }
    }

    tracing::trace!(claims, "fuzzy_word_matcher pass complete");
}

/// Run the full cascade in spec-mandated order, respecting each `cover_*` flag.
pub fn run_cascade(state: &mut MatchState, query: &str, doc: &str, setup: &CoverageSetup) {
    if setup.cover_whole_words {
        whole_word_matcher(state, query, doc);
    }
    if setup.cover_joined_words {
        joined_word_matcher(state, query, doc);
    }
    if setup.cover_prefix_suffix {
        prefix_suffix_matcher(state, query, doc);
    }
    if setup.cover_fuzzy_words {
        fuzzy_word_matcher(state, query, doc, setup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::CoverageBuffer;
    use crate::tokenizer::{dedup_by_content, tokenize};

    fn run(query: &str, doc: &str, setup: &CoverageSetup) -> (Vec<bool>, Vec<bool>, Vec<bool>) {
        let q_raw = tokenize(query, setup.min_word_size, &setup.delimiters);
        let q_tokens = dedup_by_content(query, &q_raw);
        let d_raw = tokenize(doc, setup.min_word_size, &setup.delimiters);
        let d_tokens = dedup_by_content(doc, &d_raw);

        let mut buffer = CoverageBuffer::new();
        let mut state = buffer.begin(&q_tokens, &d_tokens);
        run_cascade(&mut state, query, doc, setup);

        (
            state.term_has_whole.to_vec(),
            state.term_has_joined.to_vec(),
            state.term_has_prefix.to_vec(),
        )
    }

    #[test]
    fn whole_word_matches_exact_terms() {
        let setup = CoverageSetup::default();
        let (whole, _, _) = run("the matrix", "the matrix reloaded", &setup);
        assert!(whole.iter().all(|&b| b));
    }

    #[test]
    fn joined_word_direction_a_matches_two_doc_tokens() {
        let setup = CoverageSetup::default();
        let (_, joined, _) = run("batman", "bat man returns", &setup);
        assert!(joined[0]);
    }

    #[test]
    fn joined_word_direction_b_matches_two_query_tokens() {
        let setup = CoverageSetup::default();
        let (_, joined, _) = run("bat man", "batman returns", &setup);
        assert!(joined[0] && joined[1]);
    }

    #[test]
    fn prefix_suffix_matches_prefix_of_doc_token() {
        let setup = CoverageSetup::default();
        let (_, _, prefix) = run("bat", "batman superman spiderman", &setup);
        assert!(prefix[0]);
    }

    #[test]
    fn fuzzy_matches_single_substitution() {
        let setup = CoverageSetup::default();
        let q_raw = tokenize("batmam", setup.min_word_size, &setup.delimiters);
        let q_tokens = dedup_by_content("batmam", &q_raw);
        let d_raw = tokenize("batman is here", setup.min_word_size, &setup.delimiters);
        let d_tokens = dedup_by_content("batman is here", &d_raw);

        let mut buffer = CoverageBuffer::new();
        let mut state = buffer.begin(&q_tokens, &d_tokens);
        run_cascade(&mut state, "batmam", "batman is here", &setup);

        assert_eq!(state.word_hits, 1);
        assert!(!state.q_active[0]);
    }

    #[test]
    fn fuzzy_skipped_when_all_terms_fully_matched() {
        let setup = CoverageSetup::default();
        let (whole, _, _) = run("test", "this is a test", &setup);
        assert!(whole[0]);
    }

    #[test]
    fn cascade_does_not_double_claim_terms() {
        let setup = CoverageSetup::default();
        let q_raw = tokenize("two for", setup.min_word_size, &setup.delimiters);
        let q_tokens = dedup_by_content("two for", &q_raw);
        let d_raw = tokenize("tea for two", setup.min_word_size, &setup.delimiters);
        let d_tokens = dedup_by_content("tea for two", &d_raw);

        let mut buffer = CoverageBuffer::new();
        let mut state = buffer.begin(&q_tokens, &d_tokens);
        run_cascade(&mut state, "two for", "tea for two", &setup);

        // every active flag transitions false exactly once; no panics from
        // double-claims (claim() debug_asserts on this).
        assert!(state.q_active.iter().filter(|&&a| a).count() <= q_tokens.len());
    }
}
