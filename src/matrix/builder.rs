//! Sparse document-term matrix assembly.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::debug;
use ndarray::Array2;
use rayon::prelude::*;
use sprs::{CsMat, TriMat};

use crate::annotation::tables::TokenRow;
use crate::error::{Error, Result};
use crate::matrix::vocabulary::Vocabulary;
use crate::matrix::weighting::Weighting;

/// Row-grouping unit for matrix construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// One row per document.
    #[default]
    Document,
    /// One row per (document, sentence).
    Sentence,
}

impl Granularity {
    fn label(&self, token: &TokenRow) -> String {
        match self {
            Granularity::Document => token.doc_id.clone(),
            Granularity::Sentence => format!("{}#{}", token.doc_id, token.sentence),
        }
    }
}

/// A sparse matrix with parallel row-label and column-label sequences.
///
/// Rows are ordered by first appearance in the input selection, columns by
/// the vocabulary's lexicographic order. Derived and disposable; recompute
/// rather than mutate.
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatrix {
    pub mat: CsMat<f64>,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
}

impl TermMatrix {
    pub fn nrows(&self) -> usize {
        self.mat.rows()
    }

    pub fn ncols(&self) -> usize {
        self.mat.cols()
    }

    /// Cell value, zero for unstored entries.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.mat.get(row, col).copied().unwrap_or(0.0)
    }

    /// Densify into an `ndarray` matrix, the projection utility's input.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.nrows(), self.ncols()));
        for (&value, (row, col)) in self.mat.iter() {
            dense[[row, col]] = value;
        }
        dense
    }
}

/// Assembles a sparse unit-by-term matrix from a token selection, a
/// vocabulary, a granularity key, and a weighting scheme.
#[derive(Debug, Clone, Default)]
pub struct MatrixBuilder {
    granularity: Granularity,
    weighting: Weighting,
    strict_vocabulary: bool,
}

impl MatrixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Opt into [`Error::EmptyVocabulary`] instead of a zero-column matrix.
    pub fn strict_vocabulary(mut self, strict: bool) -> Self {
        self.strict_vocabulary = strict;
        self
    }

    /// Build the matrix.
    ///
    /// Every distinct granularity-key value in the selection gets a row, in
    /// first-appearance order, even when none of its tokens survived
    /// vocabulary filtering (all-zero rows are kept so caller-side metadata
    /// joins stay 1:1).
    pub fn build(&self, tokens: &[&TokenRow], vocabulary: &Vocabulary) -> Result<TermMatrix> {
        if self.strict_vocabulary && vocabulary.is_empty() {
            return Err(Error::EmptyVocabulary);
        }

        let mut units: IndexMap<String, Vec<&TokenRow>> = IndexMap::new();
        for &tok in tokens {
            units
                .entry(self.granularity.label(tok))
                .or_default()
                .push(tok);
        }
        let ncols = vocabulary.len();
        let nrows = units.len();
        let key = vocabulary.key();

        // Per-row term counts; parallel over rows, deterministic because the
        // collect preserves unit order and each map is index-sorted.
        let counted: Vec<(BTreeMap<usize, f64>, f64)> = units
            .values()
            .collect::<Vec<_>>()
            .par_iter()
            .map(|unit_tokens| {
                let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
                for &tok in unit_tokens.iter() {
                    if let Some(col) = vocabulary.position(key.term(tok)) {
                        *counts.entry(col).or_insert(0.0) += 1.0;
                    }
                }
                (counts, unit_tokens.len() as f64)
            })
            .collect();

        // Document frequency per column, over the granularity units.
        let mut df = vec![0.0f64; ncols];
        for (counts, _) in &counted {
            for &col in counts.keys() {
                df[col] += 1.0;
            }
        }

        let mut triplets = TriMat::new((nrows, ncols));
        for (row, (counts, unit_total)) in counted.iter().enumerate() {
            let norm = match self.weighting {
                Weighting::TfidfNorm => {
                    let sq: f64 = counts
                        .values()
                        .map(|c| (c / unit_total) * (c / unit_total))
                        .sum();
                    sq.sqrt()
                }
                _ => 0.0,
            };
            for (&col, &count) in counts {
                let tf = count / unit_total;
                let value = match self.weighting {
                    Weighting::Count => count,
                    Weighting::Tf => tf,
                    Weighting::TfidfRaw | Weighting::TfidfSmooth => {
                        tf * self
                            .weighting
                            .idf(nrows as f64, df[col])
                            .unwrap_or(0.0)
                    }
                    Weighting::TfidfNorm => {
                        let scaled = if norm > 0.0 { tf / norm } else { 0.0 };
                        scaled
                            * self
                                .weighting
                                .idf(nrows as f64, df[col])
                                .unwrap_or(0.0)
                    }
                };
                if value != 0.0 {
                    triplets.add_triplet(row, col, value);
                }
            }
        }

        debug!(
            "built {}x{} {} matrix ({} stored values)",
            nrows,
            ncols,
            self.weighting,
            triplets.nnz()
        );

        Ok(TermMatrix {
            mat: triplets.to_csr(),
            row_labels: units.keys().cloned().collect(),
            col_labels: vocabulary.terms().iter().map(|t| t.to_string()).collect(),
        })
    }
}
