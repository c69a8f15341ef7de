//! Corpus store: the finalized, read-only aggregate of the four tables.

use std::collections::HashMap;
use std::ops::Range;

use crate::annotation::tables::{
    AnnotationTables, DependencyRow, DocumentRow, EntityRow, TokenRow,
};

/// A source token joined to its governed target token along one dependency
/// edge, e.g. a verb paired with its direct object.
#[derive(Debug, Clone, Copy)]
pub struct DependencyPair<'a> {
    pub source: &'a TokenRow,
    pub target: &'a TokenRow,
    pub relation: &'a str,
}

/// The in-memory aggregate all downstream operations query.
///
/// Immutable once constructed; safe to read from many threads. Joins run over
/// indexes built at construction time, never by scanning the token table per
/// lookup.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    tables: AnnotationTables,
    /// doc_id -> range into `tables.tokens`.
    doc_spans: HashMap<String, Range<usize>>,
    /// (doc_id, sentence) -> range into `tables.tokens`.
    sentence_spans: HashMap<(String, u32), Range<usize>>,
}

impl CorpusStore {
    pub(crate) fn new(tables: AnnotationTables) -> Self {
        let mut store = Self {
            tables,
            doc_spans: HashMap::new(),
            sentence_spans: HashMap::new(),
        };
        store.rebuild_spans();
        store
    }

    /// One pass over the token table; tokens for a document arrive as one
    /// contiguous block with per-sentence sub-blocks, so ranges suffice.
    fn rebuild_spans(&mut self) {
        self.doc_spans.clear();
        self.sentence_spans.clear();
        for (i, tok) in self.tables.tokens.iter().enumerate() {
            self.doc_spans
                .entry(tok.doc_id.clone())
                .and_modify(|r| r.end = i + 1)
                .or_insert(i..i + 1);
            self.sentence_spans
                .entry((tok.doc_id.clone(), tok.sentence))
                .and_modify(|r| r.end = i + 1)
                .or_insert(i..i + 1);
        }
    }

    pub fn doc_count(&self) -> usize {
        self.tables.doc_count()
    }

    pub fn documents(&self) -> impl Iterator<Item = &DocumentRow> {
        self.tables.documents.values()
    }

    pub fn document(&self, doc_id: &str) -> Option<&DocumentRow> {
        self.tables.documents.get(doc_id)
    }

    pub fn tokens(&self) -> &[TokenRow] {
        &self.tables.tokens
    }

    pub fn dependencies(&self) -> &[DependencyRow] {
        &self.tables.dependencies
    }

    pub fn entities(&self) -> &[EntityRow] {
        &self.tables.entities
    }

    /// All tokens of one document, in (sentence, index) order.
    pub fn tokens_for(&self, doc_id: &str) -> &[TokenRow] {
        match self.doc_spans.get(doc_id) {
            Some(range) => &self.tables.tokens[range.clone()],
            None => &[],
        }
    }

    /// Tokens carrying the given coarse part-of-speech tag.
    pub fn tokens_with_upos(&self, upos: &str) -> Vec<&TokenRow> {
        self.tables
            .tokens
            .iter()
            .filter(|tok| tok.upos == upos)
            .collect()
    }

    pub fn dependencies_with_relation(&self, relation: &str) -> Vec<&DependencyRow> {
        self.tables
            .dependencies
            .iter()
            .filter(|dep| dep.relation == relation)
            .collect()
    }

    pub fn entities_with_type(&self, entity_type: &str) -> Vec<&EntityRow> {
        self.tables
            .entities
            .iter()
            .filter(|ent| ent.entity_type == entity_type)
            .collect()
    }

    /// Token-to-document join: every token paired with its document row.
    pub fn join_metadata(&self) -> impl Iterator<Item = (&TokenRow, &DocumentRow)> {
        self.tables.tokens.iter().map(move |tok| {
            let doc = self
                .tables
                .documents
                .get(&tok.doc_id)
                .expect("token references a document present by construction");
            (tok, doc)
        })
    }

    /// Token-to-token join along every dependency edge.
    pub fn dependency_pairs(&self) -> Vec<DependencyPair<'_>> {
        self.tables
            .dependencies
            .iter()
            .filter_map(|dep| {
                let range = self
                    .sentence_spans
                    .get(&(dep.doc_id.clone(), dep.sentence))?;
                let sentence = &self.tables.tokens[range.clone()];
                Some(DependencyPair {
                    source: sentence.get(dep.source as usize - 1)?,
                    target: sentence.get(dep.target as usize - 1)?,
                    relation: &dep.relation,
                })
            })
            .collect()
    }

    /// Reconstruct the original text of a document by concatenating the
    /// whitespace-inclusive surface forms in (sentence, index) order.
    pub fn reconstruct_text(&self, doc_id: &str) -> Option<String> {
        self.document(doc_id)?;
        Some(
            self.tokens_for(doc_id)
                .iter()
                .map(|tok| tok.with_ws.as_str())
                .collect(),
        )
    }
}
