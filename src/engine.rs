//! [`CoverageEngine`]: the crate's facade.
//!
//! Owns the per-query context cache and the optional collaborator caches
//! (term collection, word-IDF cache, document metadata cache), installed
//! once post-indexing and read thereafter without locking on the hot path.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::buffer;
use crate::config::CoverageSetup;
use crate::context::CoverageQueryContext;
use crate::coverage::{self, CoverageFeatures};
use crate::error::Result;
use crate::external::{DocumentMetadataCache, TermCollection, WordIdfCache};
use crate::fusion;
use crate::fusion_signals::compute_fusion_signals;
use crate::matchers::run_cascade;
use crate::tokenizer::{dedup_by_content, tokenize};

/// Facade tying the tokenizer, matcher cascade, coverage scorer, and fusion
/// signals together behind a per-query cache.
pub struct CoverageEngine {
    setup: CoverageSetup,
    query_cache: DashMap<String, Arc<CoverageQueryContext>>,
    term_collection: RwLock<Option<Arc<dyn TermCollection>>>,
    word_idf_cache: RwLock<Option<Arc<dyn WordIdfCache>>>,
    document_metadata_cache: RwLock<Option<Arc<dyn DocumentMetadataCache>>>,
}

impl CoverageEngine {
    /// Build an engine for the given configuration. Fails only on an invalid
    /// `setup`.
    pub fn new(setup: CoverageSetup) -> Result<Self> {
        setup.validate()?;
        Ok(CoverageEngine {
            setup,
            query_cache: DashMap::new(),
            term_collection: RwLock::new(None),
            word_idf_cache: RwLock::new(None),
            document_metadata_cache: RwLock::new(None),
        })
    }

    /// Install (or replace) the term collection used for IDF lookups.
    pub fn set_term_collection(&self, term_collection: Arc<dyn TermCollection>) {
        *self.term_collection.write() = Some(term_collection);
    }

    /// Install (or replace) the word-level IDF cache.
    pub fn set_word_idf_cache(&self, cache: Arc<dyn WordIdfCache>) {
        *self.word_idf_cache.write() = Some(cache);
    }

    /// Install (or replace) the document metadata cache.
    pub fn set_document_metadata_cache(&self, cache: Arc<dyn DocumentMetadataCache>) {
        *self.document_metadata_cache.write() = Some(cache);
    }

    /// Prepare (or fetch from cache) the [`CoverageQueryContext`] for `query`.
    /// Last writer wins on a concurrent re-prepare of the same query string.
    pub fn prepare_query(&self, query: &str) -> Arc<CoverageQueryContext> {
        if let Some(cached) = self.query_cache.get(query) {
            return cached.clone();
        }
        let term_collection = self.term_collection.read();
        let word_idf_cache = self.word_idf_cache.read();
        let ctx = CoverageQueryContext::prepare(
            query,
            &self.setup,
            term_collection.as_deref(),
            word_idf_cache.as_deref(),
        );
        self.query_cache.insert(query.to_string(), ctx.clone());
        ctx
    }

    /// Derive [`CoverageFeatures`] for one `(query, document)` pair.
    ///
    /// `doc_id` keys the optional document metadata cache lookup; absent
    /// metadata falls back to [`crate::external::DocumentMetadata::EMPTY`].
    pub fn calculate_features(
        &self,
        query: &str,
        doc_text: &str,
        lcs_sum: f32,
        doc_id: i64,
    ) -> CoverageFeatures {
        let ctx = self.prepare_query(query);
        if ctx.is_empty() {
            return CoverageFeatures::empty();
        }

        let d_raw = tokenize(doc_text, self.setup.min_word_size, &self.setup.delimiters);
        let d_tokens = dedup_by_content(doc_text, &d_raw);
        let doc_token_count = d_tokens.len() as u32;

        let mut buffer = buffer::acquire();
        let mut state = buffer.begin(&ctx.query_tokens, &d_tokens);
        run_cascade(&mut state, query, doc_text, &self.setup);

        let metadata = self
            .document_metadata_cache
            .read()
            .as_ref()
            .and_then(|cache| cache.metadata(&doc_id.to_string()));
        let fusion = compute_fusion_signals(query, doc_text, &self.setup, metadata.as_ref());

        let features = coverage::calculate_features(
            &state,
            &ctx,
            &self.setup,
            lcs_sum,
            doc_token_count,
            fusion,
        );
        tracing::trace!(doc_id, coverage_score = features.coverage_score, "calculated features");
        features
    }

    /// Convenience wrapper returning only the 0-255 coverage byte.
    pub fn calculate_coverage_score(&self, query: &str, doc_text: &str, lcs_sum: f32) -> u8 {
        self.calculate_features(query, doc_text, lcs_sum, 0).coverage_score
    }

    /// Derive features for one `(query, document)` pair and fold them, plus
    /// an externally-supplied BM25 score, into the packed fusion ranking key.
    pub fn calculate_score(
        &self,
        query: &str,
        doc_text: &str,
        lcs_sum: f32,
        doc_id: i64,
        bm25_score: f32,
    ) -> (u16, u8) {
        let features = self.calculate_features(query, doc_text, lcs_sum, doc_id);
        fusion::calculate(
            &features,
            bm25_score,
            query.chars().count(),
            doc_text.chars().count(),
            &self.setup,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_rejects_invalid_setup() {
        let setup = CoverageSetup::default().with_levenshtein_max_word_size(200);
        assert!(CoverageEngine::new(setup).is_err());
    }

    #[test]
    fn prepare_query_caches_contexts() {
        let engine = CoverageEngine::new(CoverageSetup::default()).unwrap();
        let a = engine.prepare_query("the matrix");
        let b = engine.prepare_query("the matrix");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn calculate_coverage_score_for_exact_match() {
        // Exercise the tracing::trace! call on the calculate_features path
        // under an active subscriber so a malformed log statement would fail
        // the test instead of silently panicking only in instrumented builds.
        let _ = tracing_subscriber::fmt::try_init();
        let engine = CoverageEngine::new(CoverageSetup::default()).unwrap();
        let score = engine.calculate_coverage_score("matrix", "the matrix reloaded", 0.0);
        assert!(score > 0);
    }

    #[test]
    fn calculate_features_for_empty_query_is_empty() {
        let engine = CoverageEngine::new(CoverageSetup::default()).unwrap();
        let features = engine.calculate_features("", "anything", 0.0, 1);
        assert_eq!(features.terms_count, 0);
    }

    #[test]
    fn calculate_score_fuses_features_with_bm25() {
        let engine = CoverageEngine::new(CoverageSetup::default()).unwrap();
        let (score, _) = engine.calculate_score("the matrix", "the matrix reloaded", 0.0, 1, 0.5);
        assert!(score > 0);
    }

    #[test]
    fn calculate_score_honors_configured_intent_bonus() {
        let low = CoverageSetup::default().with_intent_bonus_per_signal(0.0);
        let high = CoverageSetup::default().with_intent_bonus_per_signal(0.5);
        let query = "the matrix reloaded today";
        let doc = "the matrix reloaded today";

        let engine_low = CoverageEngine::new(low).unwrap();
        let engine_high = CoverageEngine::new(high).unwrap();
        let (score_low, _) = engine_low.calculate_score(query, doc, 0.0, 1, 0.0);
        let (score_high, _) = engine_high.calculate_score(query, doc, 0.0, 1, 0.0);

        let semantic_low = (score_low & 0xFF) as u8;
        let semantic_high = (score_high & 0xFF) as u8;
        assert!(semantic_high >= semantic_low);
    }
}
