//! Persisted artifacts.
//!
//! One directory holds everything the server needs:
//!
//! | file                    | content                                  |
//! |-------------------------|------------------------------------------|
//! | `feature_encoder.json`  | fitted genre/text/year encoders          |
//! | `model.json`            | autoencoder weights keyed by layer       |
//! | `embeddings.json`       | `{rows, dim, data}` embeddings matrix    |
//! | `catalog.json`          | catalog rows with explicit `id`          |
//!
//! Saving writes into a staging directory and renames it into place only
//! once every file is written. Loading checks that the pieces fit together.

use crate::autoencoder::Autoencoder;
use crate::error::{ModelError, Result};
use data_loader::{Catalog, CatalogRow};
use pipeline::FeatureEncoder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use similarity::EmbeddingMatrix;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const FEATURE_ENCODER_FILE: &str = "feature_encoder.json";
pub const MODEL_FILE: &str = "model.json";
pub const EMBEDDINGS_FILE: &str = "embeddings.json";
pub const CATALOG_FILE: &str = "catalog.json";

/// Everything produced by a training run
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub catalog: Catalog,
    pub feature_encoder: FeatureEncoder,
    pub model: Autoencoder,
    pub embeddings: EmbeddingMatrix,
}

impl ArtifactSet {
    /// Check that encoder, model, embeddings and catalog agree on shapes
    pub fn validate(&self) -> Result<()> {
        self.feature_encoder.validate()?;

        if self.model.input_dim() != self.feature_encoder.width() {
            return Err(ModelError::Incompatible(format!(
                "model expects {} features but the encoder produces {}",
                self.model.input_dim(),
                self.feature_encoder.width()
            )));
        }
        if self.embeddings.dim() != self.model.embedding_dim() {
            return Err(ModelError::Incompatible(format!(
                "embeddings have {} dims but the model produces {}",
                self.embeddings.dim(),
                self.model.embedding_dim()
            )));
        }
        if self.embeddings.rows() != self.catalog.len() {
            return Err(ModelError::Incompatible(format!(
                "{} embedding rows for {} catalog rows",
                self.embeddings.rows(),
                self.catalog.len()
            )));
        }
        Ok(())
    }

    /// Write the set to `dir`, replacing any previous set there
    pub fn save(&self, dir: &Path) -> Result<()> {
        self.validate()?;

        let staging = sibling(dir, "staging");
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|source| io_error(&staging, source))?;
        }
        fs::create_dir_all(&staging).map_err(|source| io_error(&staging, source))?;

        let written = self.write_files(&staging);
        if let Err(err) = written {
            let _ = fs::remove_dir_all(&staging);
            return Err(err);
        }

        let backup = sibling(dir, "previous");
        if dir.exists() {
            fs::rename(dir, &backup).map_err(|source| io_error(dir, source))?;
        }
        if let Err(source) = fs::rename(&staging, dir) {
            if backup.exists() {
                let _ = fs::rename(&backup, dir);
            }
            return Err(io_error(dir, source));
        }
        if backup.exists() {
            if let Err(err) = fs::remove_dir_all(&backup) {
                warn!("Could not remove previous artifacts at {}: {}", backup.display(), err);
            }
        }

        info!("Saved artifacts to {}", dir.display());
        Ok(())
    }

    fn write_files(&self, dir: &Path) -> Result<()> {
        write_json(&dir.join(FEATURE_ENCODER_FILE), &self.feature_encoder)?;
        write_json(&dir.join(MODEL_FILE), &self.model)?;
        write_json(&dir.join(EMBEDDINGS_FILE), &self.embeddings)?;
        write_json(&dir.join(CATALOG_FILE), &self.catalog.to_rows())?;
        Ok(())
    }

    /// Read and validate a set from `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        info!("Loading artifacts from {}", dir.display());

        let feature_encoder: FeatureEncoder = read_json(&dir.join(FEATURE_ENCODER_FILE))?;
        let model: Autoencoder = read_json(&dir.join(MODEL_FILE))?;
        let embeddings: EmbeddingMatrix = read_json(&dir.join(EMBEDDINGS_FILE))?;
        let rows: Vec<CatalogRow> = read_json(&dir.join(CATALOG_FILE))?;
        let catalog = Catalog::from_rows(rows)?;

        let set = Self {
            catalog,
            feature_encoder,
            model,
            embeddings,
        };
        set.validate()?;
        info!(
            "Loaded {} movies, {} features, {}-dim embeddings",
            set.catalog.len(),
            set.feature_encoder.width(),
            set.embeddings.dim()
        );
        Ok(set)
    }
}

/// `<parent>/.<name>.<suffix>` next to `dir`
fn sibling(dir: &Path, suffix: &str) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifacts".to_string());
    let parent = dir.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!(".{name}.{suffix}"))
}

fn io_error(path: &Path, source: std::io::Error) -> ModelError {
    ModelError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    debug!("Writing {}", path.display());
    let file = fs::File::create(path).map_err(|source| io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| ModelError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| io_error(path, source))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(ModelError::MissingArtifact(path.to_path_buf()));
    }
    let file = fs::File::open(path).map_err(|source| io_error(path, source))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ModelError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_paths() {
        assert_eq!(
            sibling(Path::new("out/artifacts"), "staging"),
            PathBuf::from("out/.artifacts.staging")
        );
    }

    #[test]
    fn test_load_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactSet::load(&dir.path().join("nothing")).unwrap_err();
        assert!(matches!(err, ModelError::MissingArtifact(_)));
    }
}
