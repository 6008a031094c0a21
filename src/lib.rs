//! Lexical coverage and fusion-ranking core for typeahead full-text search.
//!
//! Given a query and a candidate document's text, this crate derives a
//! feature vector describing how well the document covers the query
//! (whole-word, joined-word, prefix/suffix, and fuzzy matches), then folds
//! those features plus an externally-supplied BM25 score into a single
//! packed `(score, tiebreaker)` ranking key. A bucketed top-K store and a
//! segment consolidator round out the path from per-candidate scoring to an
//! ordered result list.
//!
//! The posting-list index, the document repository, and the BM25 scorer
//! itself are out of scope — see [`external`] for the collaborator
//! contracts this crate consumes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod config;
pub mod consolidate;
pub mod context;
pub mod coverage;
pub mod edit_distance;
pub mod engine;
pub mod error;
pub mod external;
pub mod fusion;
pub mod fusion_signals;
pub mod match_state;
pub mod matchers;
pub mod normalize;
pub mod score_array;
pub mod token;
pub mod tokenizer;

pub use config::CoverageSetup;
pub use context::CoverageQueryContext;
pub use coverage::CoverageFeatures;
pub use engine::CoverageEngine;
pub use error::{Error, Result};
pub use fusion_signals::FusionSignals;
pub use score_array::{ScoreArray, ScoredEntry};
pub use token::StringSlice;
