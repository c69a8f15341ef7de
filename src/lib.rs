/// This crate normalizes the output of natural-language-annotation backends
/// into a small set of relationally-linked tables (the tidy annotation model)
/// and derives sparse document-term matrices and principal-component
/// projections from them.
pub mod annotation;
pub mod error;
pub mod matrix;
pub mod projection;

/// Error taxonomy and result alias for the whole crate.
pub use error::{Error, Result};

/// Backend input interface
/// One record set per document: token records (required), dependency and
/// entity records (optional). Any backend producing records in this shape is
/// interchangeable; the crate never inspects backend-specific content beyond
/// the structural contract.
pub use annotation::record::{DependencyRecord, DocumentAnnotation, EntityRecord, TokenRecord};

/// Table Builder
/// Converts a stream of per-document backend outputs into the four tidy
/// tables (Document, Token, Dependency, Entity) with consistent keys.
/// Validation is fail-fast: a document that breaks referential integrity or
/// index ordering is rejected as a whole and the tables stay untouched.
///
/// For parallel ingest, [`TableBuilder::normalize`] is a pure function that
/// worker threads can run concurrently; the resulting [`DocumentRows`] are
/// committed one document at a time via [`TableBuilder::append_rows`].
pub use annotation::builder::{DocumentRows, TableBuilder};

/// Tidy table rows
/// The four row types with stable column semantics. Every document
/// identifier referenced by Token/Dependency/Entity rows exists in the
/// Document table; (doc_id, sentence, index) is a unique, gap-free token key.
pub use annotation::tables::{DependencyRow, DocumentRow, EntityRow, TokenRow};

/// Corpus Store
/// The immutable in-memory aggregate of the four tables for a whole corpus.
/// Exposes filters (by tag, relation, entity type) and the two pervasive
/// joins: token-to-document metadata and token-to-token along dependency
/// edges. Safe to share across threads once built.
pub use annotation::store::{CorpusStore, DependencyPair};

/// Vocabulary Selector
/// Computes the retained term set under document-frequency bounds, keyed by
/// lemma or surface form, ordered lexicographically for deterministic column
/// order.
pub use matrix::vocabulary::{TermKey, Vocabulary};

/// Matrix Builder
/// Assembles a sparse unit-by-term matrix from a token selection, a
/// vocabulary, a granularity key, and a weighting scheme. Rows are kept for
/// every distinct granularity-key value, including all-zero ones.
pub use matrix::builder::{Granularity, MatrixBuilder, TermMatrix};

/// Weighting schemes
/// `count`, `tf`, `tfidf-raw`, `tfidf-norm`, `tfidf-smooth`; parseable from
/// their scheme names via `FromStr`.
pub use matrix::weighting::Weighting;

/// Projection Utility
/// Centered (optionally scaled) principal-component projection with
/// per-component explained-variance fractions and deterministic component
/// signs.
pub use projection::{Pca, Projection};
