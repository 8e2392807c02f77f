//! # Training Orchestrator
//!
//! One offline run turns a corpus into a complete artifact set:
//! 1. Load and ingest the corpus CSV (aborts if the file is missing)
//! 2. Fit the feature encoder over the whole corpus
//! 3. Build the full feature matrix
//! 4. Initialize the autoencoder (`input_dim` = feature width)
//! 5. Train for a fixed number of epochs over shuffled mini-batches with
//!    Adam, logging the average batch loss of every epoch
//! 6. Embed the full feature matrix with the trained encoder half
//! 7. Persist encoder state, model weights, embeddings and catalog

use crate::artifacts::ArtifactSet;
use crate::autoencoder::Autoencoder;
use crate::config::TrainingConfig;
use crate::error::{ModelError, Result};
use crate::optimizer::Adam;
use data_loader::Catalog;
use pipeline::FeatureEncoder;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use similarity::EmbeddingMatrix;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Summary of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub rows: usize,
    pub input_dim: usize,
    pub embedding_dim: usize,
    /// Mean batch loss of each epoch, in order
    pub epoch_losses: Vec<f32>,
    pub elapsed: Duration,
}

/// Train on an already-ingested catalog.
#[instrument(skip(catalog, config), fields(rows = catalog.len()))]
pub fn train(catalog: Catalog, config: &TrainingConfig) -> Result<(ArtifactSet, TrainingReport)> {
    let start = Instant::now();
    config.validate()?;
    catalog.validate()?;

    let feature_encoder = FeatureEncoder::fit(catalog.records(), config.max_text_features)?;
    let features = feature_encoder.transform_batch(catalog.records());
    let input_dim = feature_encoder.width();
    info!("Input feature dimension: {}", input_dim);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut model = Autoencoder::new(input_dim, &config.hidden_dims, config.embedding_dim, &mut rng)?;

    let epoch_losses = fit_model(&mut model, &features, config, &mut rng)?;

    let embeddings = EmbeddingMatrix::from_rows(model.embed_batch(&features)?, config.embedding_dim)?;
    info!(
        "Generated embeddings for {} movies ({} dims)",
        embeddings.rows(),
        embeddings.dim()
    );

    let report = TrainingReport {
        rows: catalog.len(),
        input_dim,
        embedding_dim: config.embedding_dim,
        epoch_losses,
        elapsed: start.elapsed(),
    };
    let artifacts = ArtifactSet {
        catalog,
        feature_encoder,
        model,
        embeddings,
    };
    artifacts.validate()?;
    Ok((artifacts, report))
}

/// Full offline run: corpus CSV in, artifact directory out.
///
/// Nothing is written unless training succeeds.
pub fn train_from_csv(data: &Path, artifacts_dir: &Path, config: &TrainingConfig) -> Result<TrainingReport> {
    config.validate()?;
    let catalog = Catalog::load_from_csv(data)?;

    let (artifacts, report) = train(catalog, config)?;
    artifacts.save(artifacts_dir)?;

    info!(
        "Training complete in {:.2?}; artifacts written to {}",
        report.elapsed,
        artifacts_dir.display()
    );
    Ok(report)
}

/// Mini-batch Adam over the feature matrix, returning per-epoch losses
fn fit_model(
    model: &mut Autoencoder,
    features: &[Vec<f32>],
    config: &TrainingConfig,
    rng: &mut StdRng,
) -> Result<Vec<f32>> {
    let mut optimizers: Vec<(Adam, Adam)> = model
        .layer_sizes()
        .into_iter()
        .map(|(w, b)| {
            (
                Adam::new(w, config.learning_rate),
                Adam::new(b, config.learning_rate),
            )
        })
        .collect();

    let mut order: Vec<usize> = (0..features.len()).collect();
    let mut epoch_losses = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        order.shuffle(rng);

        let mut loss_sum = 0.0f64;
        let mut batches = 0usize;
        for chunk in order.chunks(config.batch_size) {
            let batch: Vec<&[f32]> = chunk.iter().map(|&i| features[i].as_slice()).collect();
            let grads = model.gradients(&batch)?;

            loss_sum += grads.squared_error / (batch.len() * model.input_dim()) as f64;
            batches += 1;

            for ((weights, bias), ((w_opt, b_opt), g)) in model
                .parameters_mut()
                .zip(optimizers.iter_mut().zip(&grads.layers))
            {
                w_opt.step(weights, &g.weights);
                b_opt.step(bias, &g.bias);
            }
        }

        let loss = (loss_sum / batches.max(1) as f64) as f32;
        if !loss.is_finite() {
            return Err(ModelError::NonFiniteLoss { epoch });
        }
        info!("Epoch {}/{}, Loss: {:.6}", epoch, config.epochs, loss);
        epoch_losses.push(loss);
    }

    Ok(epoch_losses)
}
