//! Error types for the similarity crate.

use data_loader::RowId;
use thiserror::Error;

/// Structural problems with an index or a query against it.
///
/// A zero-norm query is not an error: it yields an empty result.
#[derive(Error, Debug, PartialEq)]
pub enum SimilarityError {
    /// Row id outside the index
    #[error("Row {id} out of range (index has {len} rows)")]
    RowOutOfRange { id: RowId, len: usize },

    /// No catalog title matched the query
    #[error("No title matches '{0}'")]
    TitleNotFound(String),

    /// Query vector width differs from the stored embeddings
    #[error("Query has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Embedding rows have inconsistent widths
    #[error("Embedding row {row} has {actual} dimensions, expected {expected}")]
    RaggedMatrix { row: usize, expected: usize, actual: usize },

    /// Catalog and embeddings do not pair up row for row
    #[error("Catalog has {catalog_rows} rows but embeddings matrix has {embedding_rows}")]
    Misaligned {
        catalog_rows: usize,
        embedding_rows: usize,
    },

    /// Matcher name not recognised in configuration
    #[error("Unknown title matcher '{0}' (expected sequence-ratio or normalized-levenshtein)")]
    UnknownMatcher(String),

    #[error("Index is empty")]
    EmptyIndex,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, SimilarityError>;
