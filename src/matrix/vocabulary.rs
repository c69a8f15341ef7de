//! Vocabulary selection with document-frequency bounds.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::annotation::tables::TokenRow;

/// Which token column a term is read from before counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermKey {
    Lemma,
    Surface,
}

impl TermKey {
    pub fn term<'a>(&self, token: &'a TokenRow) -> &'a str {
        match self {
            TermKey::Lemma => &token.lemma,
            TermKey::Surface => &token.surface,
        }
    }
}

/// The retained term set, ordered lexicographically so repeated runs produce
/// matrices with identical column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    key: TermKey,
    /// term -> column position; iteration order is lexicographic.
    positions: IndexMap<String, usize>,
}

impl Vocabulary {
    /// Select the terms whose document frequency lies in `[min_df, max_df]`.
    ///
    /// Document frequency is the fraction of distinct documents in the
    /// selection containing the term at least once. An empty result is valid
    /// and yields zero-column matrices downstream.
    pub fn select(tokens: &[&TokenRow], key: TermKey, min_df: f64, max_df: f64) -> Self {
        let mut docs_with_term: HashMap<&str, HashSet<&str>> = HashMap::new();
        let mut docs: HashSet<&str> = HashSet::new();
        for &tok in tokens {
            docs.insert(&tok.doc_id);
            docs_with_term
                .entry(key.term(tok))
                .or_default()
                .insert(&tok.doc_id);
        }

        let total = docs.len() as f64;
        let mut terms: Vec<&str> = docs_with_term
            .iter()
            .filter(|(_, docs)| {
                let df = docs.len() as f64 / total;
                min_df <= df && df <= max_df
            })
            .map(|(term, _)| *term)
            .collect();
        terms.sort_unstable();

        let positions = terms
            .into_iter()
            .enumerate()
            .map(|(col, term)| (term.to_string(), col))
            .collect();
        Self { key, positions }
    }

    pub fn key(&self) -> TermKey {
        self.key
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Column position of a term, if retained.
    pub fn position(&self, term: &str) -> Option<usize> {
        self.positions.get(term).copied()
    }

    /// Terms in column order.
    pub fn terms(&self) -> Vec<&str> {
        self.positions.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::builder::TableBuilder;
    use crate::annotation::test_util::doc_from_words;
    use crate::CorpusStore;

    pub(crate) fn cat_dog_store() -> CorpusStore {
        let mut builder = TableBuilder::new();
        builder
            .append(doc_from_words(Some("a"), &["the", "cat", "sat"]))
            .unwrap();
        builder
            .append(doc_from_words(Some("b"), &["the", "dog", "sat"]))
            .unwrap();
        builder.finish()
    }

    #[test]
    fn full_bounds_keep_everything_sorted() {
        let store = cat_dog_store();
        let tokens: Vec<_> = store.tokens().iter().collect();
        let vocab = Vocabulary::select(&tokens, TermKey::Lemma, 0.0, 1.0);
        assert_eq!(vocab.terms(), vec!["cat", "dog", "sat", "the"]);
        assert_eq!(vocab.position("dog"), Some(1));
    }

    #[test]
    fn min_df_drops_rare_terms() {
        let store = cat_dog_store();
        let tokens: Vec<_> = store.tokens().iter().collect();
        let vocab = Vocabulary::select(&tokens, TermKey::Lemma, 0.6, 1.0);
        assert_eq!(vocab.terms(), vec!["sat", "the"]);
        assert_eq!(vocab.len(), 2);
    }

    #[test]
    fn max_df_drops_ubiquitous_terms() {
        let store = cat_dog_store();
        let tokens: Vec<_> = store.tokens().iter().collect();
        let vocab = Vocabulary::select(&tokens, TermKey::Lemma, 0.0, 0.5);
        assert_eq!(vocab.terms(), vec!["cat", "dog"]);
    }

    #[test]
    fn impossible_bounds_yield_empty_vocabulary() {
        let store = cat_dog_store();
        let tokens: Vec<_> = store.tokens().iter().collect();
        let vocab = Vocabulary::select(&tokens, TermKey::Lemma, 0.9, 0.1);
        assert!(vocab.is_empty());
    }

    #[test]
    fn selection_is_deterministic() {
        let store = cat_dog_store();
        let tokens: Vec<_> = store.tokens().iter().collect();
        let a = Vocabulary::select(&tokens, TermKey::Surface, 0.0, 1.0);
        let b = Vocabulary::select(&tokens, TermKey::Surface, 0.0, 1.0);
        assert_eq!(a.terms(), b.terms());
    }

    #[test]
    fn empty_selection_yields_empty_vocabulary() {
        let vocab = Vocabulary::select(&[], TermKey::Lemma, 0.0, 1.0);
        assert!(vocab.is_empty());
    }
}
