//! Error types for feature encoding.

use thiserror::Error;

/// Structural problems with the encoder or its persisted state.
///
/// Sparse or malformed record fields never produce one of these: records are
/// default-filled at ingestion and unseen values encode to zero.
#[derive(Error, Debug)]
pub enum FeatureError {
    /// Nothing to fit on
    #[error("Cannot fit feature encoder on an empty corpus")]
    EmptyCorpus,

    /// `max_text_features` must keep at least one column
    #[error("Invalid text feature limit: {0}")]
    InvalidFeatureLimit(usize),

    /// Persisted encoder state is internally inconsistent
    #[error("Corrupt feature encoder state: {0}")]
    CorruptState(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, FeatureError>;
