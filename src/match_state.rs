//! [`MatchState`]: shared, scratch-owned state for one `(query, document)` pair.
//!
//! All four matchers operate on the same `MatchState`, claiming disjoint
//! `(i, j)` query/doc token pairs as they go. Once a query term is claimed
//! (`q_active[i] = false`), no later matcher may touch it again.

use crate::token::StringSlice;

/// Sentinel for "no match found" in `term_first_pos`.
pub const NO_MATCH: i32 = -1;

/// Borrowed view into a [`crate::buffer::CoverageBuffer`]'s scratch arrays,
/// scoped to one candidate document.
pub struct MatchState<'buf> {
    /// Deduplicated query tokens (borrowed from the query context).
    pub query_tokens: &'buf [StringSlice],
    /// Deduplicated document tokens for this candidate.
    pub doc_tokens: &'buf [StringSlice],
    /// Whether query term `i` is still unclaimed.
    pub q_active: &'buf mut [bool],
    /// Whether doc token `j` is still unclaimed.
    pub d_active: &'buf mut [bool],
    /// Accumulated fractional character credit per query term.
    pub term_matched_chars: &'buf mut [f32],
    /// Whether a whole-word match fired for term `i`.
    pub term_has_whole: &'buf mut [bool],
    /// Whether a joined-word match fired for term `i`.
    pub term_has_joined: &'buf mut [bool],
    /// Whether a prefix/suffix match fired for term `i`.
    pub term_has_prefix: &'buf mut [bool],
    /// Doc position of the match that claimed term `i`, or [`NO_MATCH`].
    pub term_first_pos: &'buf mut [i32],
    /// Total whole/joined/prefix word hits across all terms.
    pub word_hits: u32,
    /// Total fuzzy-matched character credit across all terms.
    pub num_fuzzy: u32,
}

impl<'buf> MatchState<'buf> {
    /// Number of query terms in this state.
    pub fn term_count(&self) -> usize {
        self.query_tokens.len()
    }

    /// Claim `(i, j)`: mark both sides inactive. Matchers call this, then set
    /// whichever `term_has_*` flag and credit fields apply.
    pub fn claim(&mut self, i: usize, j: usize) {
        debug_assert!(self.q_active[i], "term {i} claimed twice");
        debug_assert!(self.d_active[j], "doc token {j} claimed twice");
        self.q_active[i] = false;
        self.d_active[j] = false;
    }

    /// Record the doc position of the match claiming term `i`, if not already set.
    pub fn record_position(&mut self, i: usize, doc_position: i32) {
        if self.term_first_pos[i] == NO_MATCH {
            self.term_first_pos[i] = doc_position;
        }
    }

    /// True once every query term has been claimed by some matcher.
    pub fn all_terms_fully_matched(&self) -> bool {
        self.q_active.iter().all(|&active| !active)
    }
}
