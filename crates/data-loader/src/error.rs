//! Error types for the data-loader crate.
//!
//! Only structural problems are errors here. A record with a missing year,
//! genre, overview or industry is not an error: those fields are filled with
//! documented defaults during ingestion (see [`crate::parser`]).

use thiserror::Error;

/// Errors that can occur while loading the movie corpus or a catalog table
///
/// The `#[derive(Error)]` macro from thiserror implements `std::error::Error`
/// and `Display` based on the `#[error(...)]` attributes.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// Source file could not be found
    #[error("Corpus file not found: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected a record (bad quoting, invalid UTF-8, ...)
    #[error("CSV error at line {line}: {reason}")]
    CsvError { line: u64, reason: String },

    /// The corpus had no usable rows after ingestion
    #[error("Corpus is empty: {0}")]
    EmptyCorpus(String),

    /// A persisted catalog row does not sit at the position its id claims
    ///
    /// Row ids are positions in the embeddings matrix, so a mismatch means
    /// the table and the matrix can no longer be trusted to line up.
    #[error("Catalog row at position {position} carries id {id}")]
    MisalignedRow { position: usize, id: usize },
}

impl From<csv::Error> for DataLoadError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        DataLoadError::CsvError {
            line,
            reason: err.to_string(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
