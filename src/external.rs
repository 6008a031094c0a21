//! Collaborator contracts consumed, but not implemented, by this crate.
//!
//! The posting-list index, the document repository, and the BM25 scorer all
//! live outside this core. This module only pins down the shapes this crate
//! reads from them, plus no-op defaults so the engine is usable before any
//! collaborator is installed.

/// A term's corpus-level statistics, as exposed by the index's term dictionary.
pub trait TermCollection: Send + Sync {
    /// Document frequency for an n-gram, or `None` if the term is unknown.
    fn document_frequency(&self, ngram: &str) -> Option<u32>;

    /// Total number of documents in the collection, for IDF normalization.
    fn total_documents(&self) -> usize;
}

/// Per-word IDF, distinct from the n-gram based [`TermCollection`] IDF.
pub trait WordIdfCache: Send + Sync {
    /// IDF for a single word, or `None` if unknown.
    fn word_idf(&self, word: &str) -> Option<f32>;
}

/// Precomputed, cheap-to-fetch per-document metadata used by the lexical
/// fusion signals to avoid re-tokenizing documents on the fast path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Number of tokens in the document (unfiltered, no min-word-size cutoff).
    pub token_count: u32,
    /// Cached hash of the document's last token, for O(1) trailing checks.
    pub last_token_hash: i32,
}

impl DocumentMetadata {
    /// The `Empty` sentinel used when a document has no metadata on record.
    pub const EMPTY: DocumentMetadata = DocumentMetadata {
        token_count: 0,
        last_token_hash: 0,
    };
}

/// Cache of [`DocumentMetadata`] keyed by document key.
pub trait DocumentMetadataCache: Send + Sync {
    /// Metadata for a document, or `None` if not on record (caller should
    /// treat this the same as [`DocumentMetadata::EMPTY`]).
    fn metadata(&self, doc_key: &str) -> Option<DocumentMetadata>;
}

/// A document as exposed by the external document repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The document's full indexed text.
    pub indexed_text: String,
    /// Soft-delete flag; deleted documents are filtered out upstream.
    pub deleted: bool,
    /// Opaque document id.
    pub id: i64,
    /// Segment number within the owning document key.
    pub segment_number: i32,
    /// Logical document key (distinct documents may share one across segments).
    pub document_key: String,
}

/// Document lookups consumed by the segment consolidator.
pub trait DocumentCollection: Send + Sync {
    /// Fetch a document by its public (opaque) id.
    fn get_document_by_public_key(&self, id: i64) -> Option<Document>;

    /// Fetch every segment document sharing a logical document key.
    fn get_documents_for_public_key(&self, key: &str) -> Vec<Document>;

    /// Fetch one specific segment of a logical document key.
    fn get_document_of_segment(&self, key: &str, segment_number: i32) -> Option<Document>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoCollection;
    impl TermCollection for NoCollection {
        fn document_frequency(&self, _ngram: &str) -> Option<u32> {
            None
        }
        fn total_documents(&self) -> usize {
            0
        }
    }

    #[test]
    fn empty_term_collection_reports_unknown_terms() {
        let tc = NoCollection;
        assert_eq!(tc.document_frequency("anything"), None);
        assert_eq!(tc.total_documents(), 0);
    }

    #[test]
    fn document_metadata_empty_sentinel() {
        let m = DocumentMetadata::EMPTY;
        assert_eq!(m.token_count, 0);
        assert_eq!(m.last_token_hash, 0);
    }
}
