//! [`CoverageQueryContext`]: the immutable, prepared-per-query artifact.

use std::sync::Arc;

use crate::config::CoverageSetup;
use crate::external::TermCollection;
use crate::token::StringSlice;
use crate::tokenizer::{dedup_by_content, tokenize};

/// Default n-gram sizes used to average term IDF when none are configured.
const DEFAULT_INDEX_SIZES: &[usize] = &[3, 4];

/// Per-query artifact built once and reused across every candidate document.
///
/// Scoped to the lifetime of one search operation: build via
/// [`CoverageQueryContext::prepare`], release (drop) once all candidates for
/// the query have been scored.
#[derive(Debug, Clone)]
pub struct CoverageQueryContext {
    /// The original query string.
    pub query: String,
    /// Deduplicated query tokens, ordered by first occurrence.
    pub query_tokens: Vec<StringSlice>,
    /// `term_max_chars[i] == query_tokens[i].length`.
    pub term_max_chars: Vec<i32>,
    /// Average n-gram IDF per term (or the `log2(length+1)` fallback).
    pub term_idf: Vec<f32>,
    /// Optional per-token word-level IDF, from a separate cache.
    pub word_level_idf: Option<Vec<f32>>,
}

impl CoverageQueryContext {
    /// Build a query context. `term_collection` and `word_idf_cache` are
    /// optional external collaborators: absent, they fall back
    /// to `log2(length+1)` and `None` respectively rather than erroring.
    pub fn prepare(
        query: &str,
        setup: &CoverageSetup,
        term_collection: Option<&dyn TermCollection>,
        word_idf_cache: Option<&dyn crate::external::WordIdfCache>,
    ) -> Arc<CoverageQueryContext> {
        tracing::debug!(query_len = query.len(), "preparing query context");

        let raw = tokenize(query, setup.min_word_size, &setup.delimiters);
        let query_tokens = dedup_by_content(query, &raw);

        let term_max_chars: Vec<i32> = query_tokens.iter().map(|t| t.length).collect();

        let term_idf: Vec<f32> = query_tokens
            .iter()
            .map(|t| compute_term_idf(t.text(query), term_collection, DEFAULT_INDEX_SIZES))
            .collect();

        let word_level_idf = word_idf_cache.map(|cache| {
            query_tokens
                .iter()
                .map(|t| {
                    cache
                        .word_idf(&t.text(query).to_lowercase())
                        .unwrap_or_else(|| (t.length as f32 + 1.0).log2())
                })
                .collect()
        });

        Arc::new(CoverageQueryContext {
            query: query.to_string(),
            query_tokens,
            term_max_chars,
            term_idf,
            word_level_idf,
        })
    }

    /// Number of deduplicated query terms.
    pub fn term_count(&self) -> usize {
        self.query_tokens.len()
    }

    /// True for an empty or whitespace-only query.
    pub fn is_empty(&self) -> bool {
        self.query_tokens.is_empty()
    }
}

/// BM25-style IDF over n-grams of `term`, averaged across the configured
/// index sizes.
///
/// Falls back to `log2(length+1)` when the term collection is absent or the
/// term is entirely unknown to it.
pub fn compute_term_idf(
    term: &str,
    term_collection: Option<&dyn TermCollection>,
    index_sizes: &[usize],
) -> f32 {
    let fallback = || (term.len() as f32 + 1.0).log2();

    let Some(tc) = term_collection else {
        return fallback();
    };

    let total_documents = tc.total_documents() as f32;
    let mut idfs = Vec::new();
    for &size in index_sizes {
        for ngram in ngrams(term, size) {
            if let Some(df) = tc.document_frequency(&ngram) {
                idfs.push(bm25_idf(total_documents, df as f32));
            }
        }
    }

    if idfs.is_empty() {
        fallback()
    } else {
        idfs.iter().sum::<f32>() / idfs.len() as f32
    }
}

/// BM25 IDF with +1 smoothing: `ln((N - df + 0.5) / (df + 0.5) + 1)`.
pub fn bm25_idf(total_documents: f32, document_frequency: f32) -> f32 {
    ((total_documents - document_frequency + 0.5) / (document_frequency + 0.5) + 1.0).ln()
}

fn ngrams(term: &str, size: usize) -> Vec<String> {
    let bytes: Vec<char> = term.chars().collect();
    if size == 0 || bytes.len() < size {
        return Vec::new();
    }
    (0..=bytes.len() - size)
        .map(|i| bytes[i..i + size].iter().collect())
        .collect()
}
