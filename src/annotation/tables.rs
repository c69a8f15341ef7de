//! The tidy annotation tables.
//!
//! Four relationally-linked tables with stable column semantics. Row order is
//! append order; documents are keyed by id in an `IndexMap` so insertion
//! order doubles as first-appearance order downstream.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One row per input text unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRow {
    pub doc_id: String,
    /// Opaque key-value metadata supplied by the caller.
    pub metadata: IndexMap<String, String>,
    /// Character length of the reconstructed text.
    pub text_len: usize,
}

/// One row per token. (doc_id, sentence, index) is a unique key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRow {
    pub doc_id: String,
    pub sentence: u32,
    pub index: u32,
    pub surface: String,
    pub with_ws: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: String,
    pub char_start: usize,
    pub char_end: usize,
}

/// One row per syntactic edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRow {
    pub doc_id: String,
    pub sentence: u32,
    pub source: u32,
    pub target: u32,
    pub relation: String,
}

/// One row per named-entity span. `end` is inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRow {
    pub doc_id: String,
    pub sentence: u32,
    pub start: u32,
    pub end: u32,
    pub entity_type: String,
    pub text: String,
}

/// The four tables for one corpus.
///
/// Append-only while the table builder owns them; immutable once wrapped in
/// a [`CorpusStore`](crate::annotation::store::CorpusStore).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationTables {
    pub documents: IndexMap<String, DocumentRow>,
    pub tokens: Vec<TokenRow>,
    pub dependencies: Vec<DependencyRow>,
    pub entities: Vec<EntityRow>,
}

impl AnnotationTables {
    pub fn doc_count(&self) -> usize {
        self.documents.len()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}
