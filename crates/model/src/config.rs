//! Training configuration.

use crate::error::{ModelError, Result};
use pipeline::DEFAULT_MAX_TEXT_FEATURES;
use serde::{Deserialize, Serialize};

/// Hyper-parameters for one training run.
///
/// Defaults: 64-dim embeddings, hidden widths 512 and 256, 5 epochs of
/// batch 64 at learning rate 0.001, 2000 text terms, seed 42.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub embedding_dim: usize,
    /// Encoder hidden widths, outermost first; the decoder mirrors them
    pub hidden_dims: Vec<usize>,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub max_text_features: usize,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 64,
            hidden_dims: vec![512, 256],
            epochs: 5,
            batch_size: 64,
            learning_rate: 0.001,
            max_text_features: DEFAULT_MAX_TEXT_FEATURES,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("embedding_dim", self.embedding_dim),
            ("epochs", self.epochs),
            ("batch_size", self.batch_size),
            ("max_text_features", self.max_text_features),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(ModelError::InvalidConfig(format!("{name} must be at least 1")));
        }
        if self.hidden_dims.iter().any(|d| *d == 0) {
            return Err(ModelError::InvalidConfig(
                "hidden layer widths must be at least 1".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "learning_rate must be finite and positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
