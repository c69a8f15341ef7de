//! Error types for tidynlp.

use thiserror::Error;

/// Result type for tidynlp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tidynlp operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Backend records broke a table invariant: referential integrity,
    /// index ordering, or a duplicate document key.
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// Unknown weighting scheme name.
    #[error("invalid weighting scheme: {0:?}")]
    InvalidWeighting(String),

    /// Requested component count exceeds min(rows, columns).
    #[error("dimension error: requested {requested} components, bound is {bound}")]
    DimensionError {
        /// Component count the caller asked for.
        requested: usize,
        /// min(rows, columns) of the input matrix.
        bound: usize,
    },

    /// The vocabulary came out empty while the caller required a non-empty one.
    #[error("vocabulary is empty")]
    EmptyVocabulary,
}
