//! The serving context.
//!
//! Everything a query needs, loaded once at startup and never mutated:
//! the catalog paired with its embeddings, the fitted feature encoder, the
//! trained model (only its encoder half is used here) and the title
//! resolver. Handlers share it through an `Arc` and read it without locks.

use data_loader::RowId;
use model::{ArtifactSet, Autoencoder, ModelError};
use pipeline::FeatureEncoder;
use serde::{Deserialize, Serialize};
use similarity::{CatalogIndex, Neighbor, TitleMatch, TitleResolver};
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::Result;

/// Year assumed for a cold record that does not give one
pub const DEFAULT_COLD_YEAR: i32 = 2024;

fn default_cold_year() -> i32 {
    DEFAULT_COLD_YEAR
}

/// A movie described by the caller rather than looked up in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColdRecord {
    /// Informational only; the encoder does not read titles
    #[serde(default)]
    pub title: Option<String>,
    pub overview: String,
    #[serde(default = "default_cold_year")]
    pub year: i32,
    #[serde(default)]
    pub genres: Vec<String>,
}

pub struct ServingContext {
    index: CatalogIndex,
    feature_encoder: FeatureEncoder,
    model: Autoencoder,
    resolver: TitleResolver,
}

impl ServingContext {
    /// Build from a validated artifact set
    pub fn from_artifacts(
        artifacts: ArtifactSet,
        resolver: TitleResolver,
    ) -> std::result::Result<Self, ModelError> {
        artifacts.validate()?;
        let ArtifactSet {
            catalog,
            feature_encoder,
            model,
            embeddings,
        } = artifacts;

        Ok(Self {
            index: CatalogIndex::new(catalog, embeddings)?,
            feature_encoder,
            model,
            resolver,
        })
    }

    pub fn load(dir: &Path, resolver: TitleResolver) -> std::result::Result<Self, ModelError> {
        Self::from_artifacts(ArtifactSet::load(dir)?, resolver)
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn resolve_title(&self, title: &str) -> Result<TitleMatch> {
        Ok(self.resolver.resolve_title(self.index.catalog(), title)?)
    }

    pub fn similar_to_row(&self, id: RowId, k: usize) -> Result<Vec<Neighbor<'_>>> {
        Ok(self.index.similar_to_row(id, k)?)
    }

    /// Encode a cold record with the fitted encoder and the model's encoder
    /// half. The embedding is never added to the index.
    #[instrument(skip(self, record), fields(title = record.title.as_deref().unwrap_or("")))]
    pub fn embed_cold(&self, record: &ColdRecord) -> Result<Vec<f32>> {
        let genres: Vec<String> = record.genres.iter().map(|g| g.trim().to_string()).collect();
        let features = self
            .feature_encoder
            .encode(&genres, &record.overview, record.year);
        let embedding = self.model.embed(&features)?;
        debug!("Embedded cold record ({} features)", features.len());
        Ok(embedding)
    }

    pub fn similar_to_cold(&self, record: &ColdRecord, k: usize) -> Result<Vec<Neighbor<'_>>> {
        let query = self.embed_cold(record)?;
        Ok(self.index.similar_to_vector(&query, k)?)
    }
}
