//! Weighting schemes for document-term matrices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How cell values of a document-term matrix are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weighting {
    /// Raw occurrence count.
    #[default]
    Count,
    /// Count normalized by the unit's token total.
    Tf,
    /// tf x ln(N / df).
    TfidfRaw,
    /// tf scaled to unit Euclidean row norm, x ln(N / df).
    TfidfNorm,
    /// tf x ln(1 + N / (1 + df)); the +1 keeps the weight defined even at
    /// df = 0, which vocabulary filtering already rules out.
    TfidfSmooth,
}

impl Weighting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weighting::Count => "count",
            Weighting::Tf => "tf",
            Weighting::TfidfRaw => "tfidf-raw",
            Weighting::TfidfNorm => "tfidf-norm",
            Weighting::TfidfSmooth => "tfidf-smooth",
        }
    }

    /// Inverse document frequency for this scheme, or `None` when the scheme
    /// does not use idf at all.
    pub(crate) fn idf(&self, units: f64, df: f64) -> Option<f64> {
        match self {
            Weighting::Count | Weighting::Tf => None,
            Weighting::TfidfRaw | Weighting::TfidfNorm => Some((units / df).ln()),
            Weighting::TfidfSmooth => Some((1.0 + units / (1.0 + df)).ln()),
        }
    }
}

impl FromStr for Weighting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(Weighting::Count),
            "tf" => Ok(Weighting::Tf),
            "tfidf-raw" => Ok(Weighting::TfidfRaw),
            "tfidf-norm" => Ok(Weighting::TfidfNorm),
            "tfidf-smooth" => Ok(Weighting::TfidfSmooth),
            other => Err(Error::InvalidWeighting(other.to_string())),
        }
    }
}

impl fmt::Display for Weighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
