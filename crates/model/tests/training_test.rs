//! End-to-end training tests.
//!
//! Train on a small synthetic corpus, persist, reload, and check the
//! artifacts describe the same embedding space.

use data_loader::DataLoadError;
use model::{train, train_from_csv, ArtifactSet, ModelError, TrainingConfig};
use similarity::norm;
use std::io::Write;
use std::path::Path;

const GENRES: [(&str, &str); 3] = [
    ("Action", "explosive chase gunfight heist mercenary"),
    ("Drama", "family grief marriage village letters"),
    ("Comedy", "wedding prank roommates awkward reunion"),
];

/// 30 rows, 10 per genre, overviews drawn from a per-genre word pool
fn write_corpus(path: &Path) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "title,year,genre,overview,industry").unwrap();
    for i in 0..30 {
        let (genre, words) = GENRES[i % 3];
        let pool: Vec<&str> = words.split(' ').collect();
        let overview = format!(
            "A {} and {} story about {}.",
            pool[i % 5],
            pool[(i + 1) % 5],
            pool[(i + 2) % 5]
        );
        writeln!(file, "{genre} Film {i},{},{genre},{overview},Hollywood", 1990 + i).unwrap();
    }
}

fn small_config() -> TrainingConfig {
    TrainingConfig {
        embedding_dim: 8,
        hidden_dims: vec![32, 16],
        epochs: 6,
        batch_size: 5,
        learning_rate: 0.005,
        max_text_features: 50,
        seed: 7,
    }
}

#[test]
fn test_end_to_end_training() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("movies.csv");
    let out = dir.path().join("artifacts");
    write_corpus(&data);

    let report = train_from_csv(&data, &out, &small_config()).unwrap();
    assert_eq!(report.rows, 30);
    assert_eq!(report.epoch_losses.len(), 6);
    assert!(
        report.epoch_losses.windows(2).all(|w| w[1] < w[0]),
        "loss did not decrease: {:?}",
        report.epoch_losses
    );

    let artifacts = ArtifactSet::load(&out).unwrap();
    assert_eq!(artifacts.embeddings.rows(), 30);
    assert_eq!(artifacts.embeddings.dim(), 8);
    assert!(artifacts.embeddings.iter().all(|row| norm(row) > 0.0));
    assert_eq!(artifacts.feature_encoder.genres().width(), 3);
    assert_eq!(report.input_dim, artifacts.feature_encoder.width());
}

#[test]
fn test_reloaded_artifacts_reproduce_embeddings() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("movies.csv");
    let out = dir.path().join("artifacts");
    write_corpus(&data);
    train_from_csv(&data, &out, &small_config()).unwrap();

    let artifacts = ArtifactSet::load(&out).unwrap();
    for (id, record) in artifacts.catalog.iter() {
        let features = artifacts.feature_encoder.transform(record);
        let embedding = artifacts.model.embed(&features).unwrap();
        assert_eq!(Some(embedding.as_slice()), artifacts.embeddings.row(id));
    }
}

#[test]
fn test_same_seed_same_embeddings() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("movies.csv");
    write_corpus(&data);

    let catalog = data_loader::Catalog::load_from_csv(&data).unwrap();
    let (first, _) = train(catalog.clone(), &small_config()).unwrap();
    let (second, _) = train(catalog, &small_config()).unwrap();
    assert_eq!(first.embeddings, second.embeddings);
}

#[test]
fn test_missing_corpus_aborts_without_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("artifacts");

    let err = train_from_csv(&dir.path().join("missing.csv"), &out, &small_config()).unwrap_err();
    assert!(matches!(
        err,
        ModelError::Data(DataLoadError::FileNotFound { .. })
    ));
    assert!(!out.exists());
}

#[test]
fn test_retraining_replaces_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("movies.csv");
    let out = dir.path().join("artifacts");
    write_corpus(&data);

    train_from_csv(&data, &out, &small_config()).unwrap();
    let wider = TrainingConfig { embedding_dim: 4, ..small_config() };
    train_from_csv(&data, &out, &wider).unwrap();

    assert_eq!(ArtifactSet::load(&out).unwrap().embeddings.dim(), 4);
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with('.'))
        .collect();
    assert!(leftovers.is_empty(), "leftover dirs: {leftovers:?}");
}
