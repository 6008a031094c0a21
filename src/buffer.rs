//! [`CoverageBuffer`]: per-thread, pooled scratch arena for the matcher
//! cascade.
//!
//! Buffers are rented from a thread-local free list, grow monotonically as
//! larger queries/documents demand more scratch space, and are returned to
//! the pool on drop — a destructor-based scope guard.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

use crate::match_state::{MatchState, NO_MATCH};
use crate::token::StringSlice;

thread_local! {
    static POOL: RefCell<Vec<CoverageBuffer>> = RefCell::new(Vec::new());
}

/// Rent a buffer from this thread's pool, creating one if the pool is empty.
/// Returned to the pool automatically when the guard drops.
pub fn acquire() -> PooledBuffer {
    let buffer = POOL
        .with(|pool| pool.borrow_mut().pop())
        .unwrap_or_default();
    PooledBuffer {
        buffer: Some(buffer),
    }
}

/// Scope guard around a rented [`CoverageBuffer`]. Not thread-safe: confine
/// to one thread, one candidate at a time.
pub struct PooledBuffer {
    buffer: Option<CoverageBuffer>,
}

impl Deref for PooledBuffer {
    type Target = CoverageBuffer;
    fn deref(&self) -> &CoverageBuffer {
        self.buffer.as_ref().expect("buffer taken before drop")
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut CoverageBuffer {
        self.buffer.as_mut().expect("buffer taken before drop")
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            POOL.with(|pool| pool.borrow_mut().push(buffer));
        }
    }
}

/// Per-thread scratch arena backing one [`crate::match_state::MatchState`]
/// at a time. Reused across candidates within a query; release is idempotent
/// (abandoning a buffer mid-query is always safe).
#[derive(Debug, Default)]
pub struct CoverageBuffer {
    q_active: Vec<bool>,
    d_active: Vec<bool>,
    term_matched_chars: Vec<f32>,
    term_has_whole: Vec<bool>,
    term_has_joined: Vec<bool>,
    term_has_prefix: Vec<bool>,
    term_first_pos: Vec<i32>,
    doc_tokens: Vec<StringSlice>,
}

impl CoverageBuffer {
    /// Create an empty buffer. Prefer [`acquire`] in production code paths.
    pub fn new() -> Self {
        CoverageBuffer::default()
    }

    fn reserve_terms(&mut self, n: usize) {
        if self.q_active.len() < n {
            tracing::warn!(old = self.q_active.len(), new = n, "growing term scratch");
            self.q_active.resize(n, true);
            self.d_active.resize(n.max(self.d_active.len()), true);
            self.term_matched_chars.resize(n, 0.0);
            self.term_has_whole.resize(n, false);
            self.term_has_joined.resize(n, false);
            self.term_has_prefix.resize(n, false);
            self.term_first_pos.resize(n, NO_MATCH);
        }
    }

    fn reserve_doc_tokens(&mut self, n: usize) {
        if self.doc_tokens.len() < n {
            tracing::warn!(old = self.doc_tokens.len(), new = n, "growing doc token scratch");
            self.doc_tokens
                .resize(n, StringSlice::new("", 0, 0, 0));
            self.d_active.resize(n.max(self.d_active.len()), true);
        }
    }

    /// Rent a [`MatchState`] sized for this candidate. `doc_tokens` must
    /// already be deduplicated.
    pub fn begin<'a>(
        &'a mut self,
        query_tokens: &'a [StringSlice],
        doc_tokens: &[StringSlice],
    ) -> MatchState<'a> {
        let n = query_tokens.len();
        let d = doc_tokens.len();
        self.reserve_terms(n);
        self.reserve_doc_tokens(d);

        for i in 0..n {
            self.q_active[i] = true;
            self.term_matched_chars[i] = 0.0;
            self.term_has_whole[i] = false;
            self.term_has_joined[i] = false;
            self.term_has_prefix[i] = false;
            self.term_first_pos[i] = NO_MATCH;
        }
        for j in 0..d {
            self.d_active[j] = true;
        }
        self.doc_tokens[..d].copy_from_slice(doc_tokens);

        MatchState {
            query_tokens,
            doc_tokens: &self.doc_tokens[..d],
            q_active: &mut self.q_active[..n],
            d_active: &mut self.d_active[..d],
            term_matched_chars: &mut self.term_matched_chars[..n],
            term_has_whole: &mut self.term_has_whole[..n],
            term_has_joined: &mut self.term_has_joined[..n],
            term_has_prefix: &mut self.term_has_prefix[..n],
            term_first_pos: &mut self.term_first_pos[..n],
            word_hits: 0,
            num_fuzzy: 0,
        }
    }
}
