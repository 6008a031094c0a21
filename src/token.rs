//! [`StringSlice`]: a non-owning offset/length/position/hash view into a host string.
//!
//! Tokens never own their bytes. The host string (query or document text) outlives
//! every `StringSlice` derived from it for the duration of a single coverage call.

use serde::{Deserialize, Serialize};

/// A view into some host string, produced by tokenization.
///
/// `position` is the token's ordinal index in the stream it was cut from (the
/// query's token stream or a given document's token stream), not a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringSlice {
    /// Byte offset into the host string.
    pub offset: i32,
    /// Byte length of the slice.
    pub length: i32,
    /// Ordinal position of this token in its stream.
    pub position: i32,
    /// Cached hash of the lowercase content, for cheap equality pre-checks.
    pub hash: i32,
}

impl StringSlice {
    /// Construct a slice, computing its hash from the given host string.
    pub fn new(host: &str, offset: i32, length: i32, position: i32) -> Self {
        let hash = fold_hash(&host[offset as usize..(offset + length) as usize]);
        StringSlice {
            offset,
            length,
            position,
            hash,
        }
    }

    /// Resolve this slice against its host string.
    pub fn text<'h>(&self, host: &'h str) -> &'h str {
        &host[self.offset as usize..(self.offset + self.length) as usize]
    }

    /// Length in bytes. Matches `termMaxChars` usage in the coverage scorer.
    pub fn len(&self) -> i32 {
        self.length
    }

    /// True when the slice is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Lowercase-content hash, used to cache `StringSlice::hash` and for fast
/// pre-checks before falling back to a full case-insensitive string compare.
fn fold_hash(s: &str) -> i32 {
    let mut h: i32 = 0x811c_9dc5u32 as i32;
    for b in s.bytes() {
        let lower = b.to_ascii_lowercase();
        h ^= lower as i32;
        h = h.wrapping_mul(0x0100_0193);
    }
    h
}

/// Case-insensitive byte-wise equality between two slices resolved against
/// (possibly different) host strings.
pub fn slices_equal_ci(a: &StringSlice, ha: &str, b: &StringSlice, hb: &str) -> bool {
    if a.hash != b.hash || a.length != b.length {
        return false;
    }
    a.text(ha).eq_ignore_ascii_case(b.text(hb))
}
