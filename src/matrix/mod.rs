//! The derived-matrix layer: vocabulary selection, weighting schemes, and
//! sparse document-term matrix assembly.

pub mod builder;
pub mod vocabulary;
pub mod weighting;
