//! Table builder: per-document validation and atomic append.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::debug;

use crate::annotation::record::DocumentAnnotation;
use crate::annotation::store::CorpusStore;
use crate::annotation::tables::{
    AnnotationTables, DependencyRow, DocumentRow, EntityRow, TokenRow,
};
use crate::error::{Error, Result};

/// Validated, normalized rows for one document, ready to commit.
///
/// Produced by [`TableBuilder::normalize`], which is a pure function: worker
/// threads may normalize many documents in parallel and hand the results to
/// [`TableBuilder::append_rows`] one at a time, so each document lands in the
/// tables as one atomic unit.
#[derive(Debug, Clone)]
pub struct DocumentRows {
    document: DocumentRow,
    tokens: Vec<TokenRow>,
    dependencies: Vec<DependencyRow>,
    entities: Vec<EntityRow>,
}

impl DocumentRows {
    pub fn doc_id(&self) -> &str {
        &self.document.doc_id
    }
}

/// Converts a stream of per-document backend outputs into the four tidy
/// tables with consistent keys.
///
/// Strictly additive: a rejected document leaves the tables untouched, and
/// previously appended documents are never mutated.
#[derive(Debug, Default)]
pub struct TableBuilder {
    tables: AnnotationTables,
    auto_id: u64,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents appended so far.
    pub fn doc_count(&self) -> usize {
        self.tables.doc_count()
    }

    /// Validate one document and append its rows atomically.
    ///
    /// When the annotation carries no `doc_id`, a sequential one (`doc1`,
    /// `doc2`, ...) is assigned.
    pub fn append(&mut self, annotation: DocumentAnnotation) -> Result<()> {
        let doc_id = match &annotation.doc_id {
            Some(id) => id.clone(),
            None => format!("doc{}", self.auto_id + 1),
        };
        let auto_assigned = annotation.doc_id.is_none();
        let rows = Self::normalize(&doc_id, &annotation)?;
        self.append_rows(rows)?;
        if auto_assigned {
            self.auto_id += 1;
        }
        Ok(())
    }

    /// Validate and normalize one document without touching the tables.
    ///
    /// Fails with [`Error::SchemaViolation`] when sentence/token indices are
    /// out of order or gapped, or when a dependency or entity record
    /// references a token that is not among the given token records.
    pub fn normalize(doc_id: &str, annotation: &DocumentAnnotation) -> Result<DocumentRows> {
        // Sentences must be contiguous from 1, token indices contiguous from 1
        // within each sentence.
        let mut sentence_len: HashMap<u32, u32> = HashMap::new();
        let mut cur_sentence = 0u32;
        let mut cur_index = 0u32;
        for tok in &annotation.tokens {
            if tok.sentence == 0 || tok.index == 0 {
                return Err(Error::SchemaViolation(format!(
                    "document {doc_id}: sentence and token indices are 1-based, got ({}, {})",
                    tok.sentence, tok.index
                )));
            }
            if tok.sentence == cur_sentence {
                if tok.index != cur_index + 1 {
                    return Err(Error::SchemaViolation(format!(
                        "document {doc_id}: token index {} follows {} in sentence {}",
                        tok.index, cur_index, tok.sentence
                    )));
                }
                cur_index = tok.index;
            } else if tok.sentence == cur_sentence + 1 && tok.index == 1 {
                if cur_sentence > 0 {
                    sentence_len.insert(cur_sentence, cur_index);
                }
                cur_sentence = tok.sentence;
                cur_index = 1;
            } else {
                return Err(Error::SchemaViolation(format!(
                    "document {doc_id}: token ({}, {}) breaks sentence ordering after ({}, {})",
                    tok.sentence, tok.index, cur_sentence, cur_index
                )));
            }
        }
        if cur_sentence > 0 {
            sentence_len.insert(cur_sentence, cur_index);
        }

        let exists = |sentence: u32, index: u32| -> bool {
            index >= 1 && sentence_len.get(&sentence).is_some_and(|&len| index <= len)
        };

        for dep in &annotation.dependencies {
            if !exists(dep.sentence, dep.source) || !exists(dep.sentence, dep.target) {
                return Err(Error::SchemaViolation(format!(
                    "document {doc_id}: dependency ({} -> {}) references a missing token in sentence {}",
                    dep.source, dep.target, dep.sentence
                )));
            }
            if dep.source == dep.target && !dep.relation.eq_ignore_ascii_case("root") {
                return Err(Error::SchemaViolation(format!(
                    "document {doc_id}: self-loop on token {} in sentence {} with non-root relation {:?}",
                    dep.source, dep.sentence, dep.relation
                )));
            }
        }

        for ent in &annotation.entities {
            if ent.start > ent.end {
                return Err(Error::SchemaViolation(format!(
                    "document {doc_id}: entity span {}..={} is inverted in sentence {}",
                    ent.start, ent.end, ent.sentence
                )));
            }
            if !exists(ent.sentence, ent.start) || !exists(ent.sentence, ent.end) {
                return Err(Error::SchemaViolation(format!(
                    "document {doc_id}: entity span {}..={} references a missing token in sentence {}",
                    ent.start, ent.end, ent.sentence
                )));
            }
        }

        let text_len: usize = annotation
            .tokens
            .iter()
            .map(|tok| tok.with_ws.chars().count())
            .sum();

        let document = DocumentRow {
            doc_id: doc_id.to_string(),
            metadata: annotation.metadata.clone(),
            text_len,
        };
        let tokens = annotation
            .tokens
            .iter()
            .map(|tok| TokenRow {
                doc_id: doc_id.to_string(),
                sentence: tok.sentence,
                index: tok.index,
                surface: tok.surface.clone(),
                with_ws: tok.with_ws.clone(),
                lemma: tok.lemma.clone(),
                upos: tok.upos.clone(),
                xpos: tok.xpos.clone(),
                char_start: tok.char_start,
                char_end: tok.char_end,
            })
            .collect();
        let dependencies = annotation
            .dependencies
            .iter()
            .map(|dep| DependencyRow {
                doc_id: doc_id.to_string(),
                sentence: dep.sentence,
                source: dep.source,
                target: dep.target,
                relation: dep.relation.clone(),
            })
            .collect();
        let entities = annotation
            .entities
            .iter()
            .map(|ent| EntityRow {
                doc_id: doc_id.to_string(),
                sentence: ent.sentence,
                start: ent.start,
                end: ent.end,
                entity_type: ent.entity_type.clone(),
                text: ent.text.clone(),
            })
            .collect();

        Ok(DocumentRows {
            document,
            tokens,
            dependencies,
            entities,
        })
    }

    /// Commit one pre-validated document as an atomic unit.
    pub fn append_rows(&mut self, rows: DocumentRows) -> Result<()> {
        if self.tables.documents.contains_key(rows.doc_id()) {
            return Err(Error::SchemaViolation(format!(
                "duplicate document id {:?}",
                rows.doc_id()
            )));
        }
        debug!(
            "appending document {:?}: {} tokens, {} dependencies, {} entities",
            rows.doc_id(),
            rows.tokens.len(),
            rows.dependencies.len(),
            rows.entities.len()
        );
        self.tables
            .documents
            .insert(rows.document.doc_id.clone(), rows.document);
        self.tables.tokens.extend(rows.tokens);
        self.tables.dependencies.extend(rows.dependencies);
        self.tables.entities.extend(rows.entities);
        Ok(())
    }

    /// Replace the metadata of an already appended document.
    ///
    /// Metadata is externally supplied and joined by document id, so it may
    /// arrive after the backend output has been ingested.
    pub fn set_metadata(&mut self, doc_id: &str, metadata: IndexMap<String, String>) -> Result<()> {
        match self.tables.documents.get_mut(doc_id) {
            Some(doc) => {
                doc.metadata = metadata;
                Ok(())
            }
            None => Err(Error::SchemaViolation(format!(
                "metadata for unknown document id {doc_id:?}"
            ))),
        }
    }

    /// Declare the corpus complete and freeze the tables.
    pub fn finish(self) -> CorpusStore {
        debug!(
            "finalizing corpus: {} documents, {} tokens",
            self.tables.doc_count(),
            self.tables.token_count()
        );
        CorpusStore::new(self.tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::record::{DependencyRecord, EntityRecord};
    use crate::annotation::test_util::{doc_from_words, token};

    #[test]
    fn append_assigns_sequential_ids() {
        let mut builder = TableBuilder::new();
        builder.append(doc_from_words(None, &["a", "b"])).unwrap();
        builder.append(doc_from_words(None, &["c"])).unwrap();
        let store = builder.finish();
        assert!(store.document("doc1").is_some());
        assert!(store.document("doc2").is_some());
    }

    #[test]
    fn missing_optional_layers_are_fine() {
        let mut builder = TableBuilder::new();
        builder
            .append(doc_from_words(Some("a"), &["just", "tokens"]))
            .unwrap();
        let store = builder.finish();
        assert!(store.dependencies().is_empty());
        assert!(store.entities().is_empty());
    }

    #[test]
    fn empty_document_is_valid() {
        let mut builder = TableBuilder::new();
        builder
            .append(DocumentAnnotation::with_id("empty"))
            .unwrap();
        let store = builder.finish();
        assert_eq!(store.tokens_for("empty").len(), 0);
        assert_eq!(store.document("empty").unwrap().text_len, 0);
    }

    #[test]
    fn duplicate_doc_id_is_rejected() {
        let mut builder = TableBuilder::new();
        builder.append(doc_from_words(Some("a"), &["x"])).unwrap();
        let err = builder.append(doc_from_words(Some("a"), &["y"]));
        assert!(matches!(err, Err(Error::SchemaViolation(_))));
        // The first document survived untouched.
        assert_eq!(builder.doc_count(), 1);
    }

    #[test]
    fn gapped_token_index_is_rejected() {
        let mut ann = DocumentAnnotation::with_id("a");
        ann.tokens.push(token(1, 1, "one"));
        ann.tokens.push(token(1, 3, "three"));
        let mut builder = TableBuilder::new();
        assert!(matches!(
            builder.append(ann),
            Err(Error::SchemaViolation(_))
        ));
        assert_eq!(builder.doc_count(), 0);
    }

    #[test]
    fn sentence_gap_is_rejected() {
        let mut ann = DocumentAnnotation::with_id("a");
        ann.tokens.push(token(1, 1, "one"));
        ann.tokens.push(token(3, 1, "skip"));
        let mut builder = TableBuilder::new();
        assert!(matches!(
            builder.append(ann),
            Err(Error::SchemaViolation(_))
        ));
    }

    #[test]
    fn dangling_dependency_is_rejected() {
        let mut ann = doc_from_words(Some("a"), &["one", "two"]);
        ann.dependencies.push(DependencyRecord {
            sentence: 1,
            source: 1,
            target: 5,
            relation: "obj".into(),
        });
        let mut builder = TableBuilder::new();
        assert!(matches!(
            builder.append(ann),
            Err(Error::SchemaViolation(_))
        ));
    }

    #[test]
    fn self_loop_requires_root_relation() {
        let mut ann = doc_from_words(Some("a"), &["one"]);
        ann.dependencies.push(DependencyRecord {
            sentence: 1,
            source: 1,
            target: 1,
            relation: "ROOT".into(),
        });
        let mut builder = TableBuilder::new();
        builder.append(ann).unwrap();

        let mut bad = doc_from_words(Some("b"), &["one"]);
        bad.dependencies.push(DependencyRecord {
            sentence: 1,
            source: 1,
            target: 1,
            relation: "obj".into(),
        });
        assert!(matches!(
            builder.append(bad),
            Err(Error::SchemaViolation(_))
        ));
    }

    #[test]
    fn inverted_entity_span_is_rejected() {
        let mut ann = doc_from_words(Some("a"), &["one", "two"]);
        ann.entities.push(EntityRecord {
            sentence: 1,
            start: 2,
            end: 1,
            entity_type: "PER".into(),
            text: "two one".into(),
        });
        let mut builder = TableBuilder::new();
        assert!(matches!(
            builder.append(ann),
            Err(Error::SchemaViolation(_))
        ));
    }

    #[test]
    fn normalize_then_append_rows_matches_append() {
        let ann = doc_from_words(None, &["the", "cat"]);
        let rows = TableBuilder::normalize("d1", &ann).unwrap();
        let mut builder = TableBuilder::new();
        builder.append_rows(rows).unwrap();
        let store = builder.finish();
        assert_eq!(store.tokens_for("d1").len(), 2);
    }

    #[test]
    fn set_metadata_joins_by_id() {
        let mut builder = TableBuilder::new();
        builder.append(doc_from_words(Some("a"), &["x"])).unwrap();
        let mut meta = IndexMap::new();
        meta.insert("year".to_string(), "1989".to_string());
        builder.set_metadata("a", meta).unwrap();
        assert!(matches!(
            builder.set_metadata("nope", IndexMap::new()),
            Err(Error::SchemaViolation(_))
        ));
        let store = builder.finish();
        assert_eq!(
            store.document("a").unwrap().metadata.get("year").unwrap(),
            "1989"
        );
    }
}
