//! Autoencoder model, training and artifact persistence.
//!
//! This crate provides:
//! - `Autoencoder`: dense encoder/decoder with ReLU, hand-written backprop
//! - `Adam`: the optimizer used for training
//! - `train` / `train_from_csv`: the offline training run
//! - `ArtifactSet`: the files a training run produces and the server loads
//!
//! ## Example Usage
//! ```ignore
//! use model::{train_from_csv, ArtifactSet, TrainingConfig};
//!
//! let report = train_from_csv(Path::new("data/movies.csv"), Path::new("artifacts"), &TrainingConfig::default())?;
//! println!("final loss {:?}", report.epoch_losses.last());
//!
//! let artifacts = ArtifactSet::load(Path::new("artifacts"))?;
//! let embedding = artifacts.model.embed(&artifacts.feature_encoder.transform(record))?;
//! ```

pub mod error;
pub mod config;
pub mod layer;
pub mod optimizer;
pub mod autoencoder;
pub mod trainer;
pub mod artifacts;

// Re-export main types
pub use artifacts::{ArtifactSet, CATALOG_FILE, EMBEDDINGS_FILE, FEATURE_ENCODER_FILE, MODEL_FILE};
pub use autoencoder::{Autoencoder, ModelWeights};
pub use config::TrainingConfig;
pub use error::{ModelError, Result};
pub use layer::LayerWeights;
pub use optimizer::Adam;
pub use trainer::{train, train_from_csv, TrainingReport};
