//! Error types for the model crate.

use data_loader::DataLoadError;
use pipeline::FeatureError;
use similarity::SimilarityError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from training, inference and artifact persistence
#[derive(Error, Debug)]
pub enum ModelError {
    /// Training configuration rejected before any work starts
    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),

    /// Model weights do not describe a valid autoencoder
    #[error("Invalid model weights: {0}")]
    InvalidWeights(String),

    /// Input vector width differs from the model's input layer
    #[error("Input has {actual} features, model expects {expected}")]
    InputWidth { expected: usize, actual: usize },

    /// Training diverged
    #[error("Training loss became non-finite in epoch {epoch}")]
    NonFiniteLoss { epoch: usize },

    /// An artifact file is absent from the artifacts directory
    #[error("Missing artifact: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// Artifacts load individually but do not fit together
    #[error("Incompatible artifacts: {0}")]
    Incompatible(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Data(#[from] DataLoadError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Similarity(#[from] SimilarityError),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ModelError>;
