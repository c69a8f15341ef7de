//! Backend input records.
//!
//! Every annotation backend is expected to map its native output into these
//! structural records before it reaches the table builder. A backend that
//! cannot produce a layer (no parser, no NER model) simply leaves the
//! corresponding vector empty.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One token as emitted by a backend.
///
/// `sentence` is 1-based and resets per document; `index` is 1-based within
/// the sentence. `with_ws` carries the trailing whitespace so the original
/// text can be reconstructed losslessly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub sentence: u32,
    pub index: u32,
    pub surface: String,
    pub with_ws: String,
    pub lemma: String,
    /// Coarse part-of-speech tag (universal tag set).
    pub upos: String,
    /// Fine-grained, backend-specific part-of-speech tag.
    pub xpos: String,
    pub char_start: usize,
    pub char_end: usize,
}

/// One syntactic edge between two tokens of the same sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub sentence: u32,
    pub source: u32,
    pub target: u32,
    pub relation: String,
}

/// One named-entity span. `end` is inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub sentence: u32,
    pub start: u32,
    pub end: u32,
    pub entity_type: String,
    pub text: String,
}

/// Everything one backend run produced for one document.
///
/// `doc_id` may be omitted, in which case the table builder assigns a
/// sequential identifier. Dependency and entity layers are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentAnnotation {
    pub doc_id: Option<String>,
    /// Opaque caller-supplied metadata, joined by document id only.
    pub metadata: IndexMap<String, String>,
    pub tokens: Vec<TokenRecord>,
    pub dependencies: Vec<DependencyRecord>,
    pub entities: Vec<EntityRecord>,
}

impl DocumentAnnotation {
    /// Create an empty annotation with an explicit document id.
    pub fn with_id(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: Some(doc_id.into()),
            ..Self::default()
        }
    }
}
