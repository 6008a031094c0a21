//! Error types for the lexical coverage core.
//!
//! The core is total per spec: candidate scoring never fails, missing
//! collaborator caches fall back to sentinels, and empty queries produce
//! empty feature records. The only recoverable failure class is a malformed
//! [`crate::config::CoverageSetup`] caught at construction time. Internal
//! invariant violations (an undersized rented buffer, an out-of-range bucket
//! index) are programming errors, asserted via `debug_assert!` rather than
//! surfaced through this type.

use thiserror::Error;

/// Result type alias for coverage/fusion setup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the lexical coverage core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A [`crate::config::CoverageSetup`] failed validation.
    #[error("invalid coverage setup: {0}")]
    InvalidSetup(String),
}
