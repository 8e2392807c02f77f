//! Integration tests for the pipeline.
//!
//! These tests run the encoder and the browse filters against a catalog
//! ingested from CSV, the way the training command and the server use them.

use data_loader::{parser::parse_corpus_reader, Catalog};
use pipeline::filters::*;
use pipeline::{FeatureEncoder, FilterPipeline};

const CORPUS: &str = "title,year,genre,overview,industry
RRR,2022,\"Action, Drama\",A fictitious story about two legendary revolutionaries.,Tollywood
Kantara,2022,\"Action, Thriller\",A young tribal dons the traditions of his ancestors.,Sandalwood
Drishyam,2013,\"Crime, Drama, Thriller\",A man goes to extreme lengths to save his family.,Mollywood
Dune: Part Two,2024,\"Action, Adventure, Sci-Fi\",Paul Atreides unites with Chani and the Fremen.,
Mystery Reel,,,,
";

fn create_test_catalog() -> Catalog {
    let records = parse_corpus_reader(CORPUS.as_bytes()).unwrap();
    Catalog::from_records(records)
}

#[test]
fn test_encoder_over_ingested_catalog() {
    let catalog = create_test_catalog();
    let encoder = FeatureEncoder::fit(catalog.records(), 2000).unwrap();

    // Action, Adventure, Crime, Drama, Sci-Fi, Thriller, Unknown
    assert_eq!(encoder.genres().width(), 7);
    assert_eq!(encoder.year().min, 2000);
    assert_eq!(encoder.year().max, 2024);

    let matrix = encoder.transform_batch(catalog.records());
    assert_eq!(matrix.len(), catalog.len());
    assert!(matrix.iter().all(|row| row.len() == encoder.width()));

    // The sparse row only carries its default genre and year
    let layout = encoder.layout();
    let sparse = &matrix[4];
    assert_eq!(sparse[layout.genre.end - 1], 1.0);
    assert!(sparse[layout.text.clone()].iter().all(|v| *v == 0.0));
    assert_eq!(sparse[layout.year], 0.0);
}

#[test]
fn test_round_trip_reproduces_training_rows() {
    let catalog = create_test_catalog();
    let encoder = FeatureEncoder::fit(catalog.records(), 2000).unwrap();
    let matrix = encoder.transform_batch(catalog.records());

    let persisted = serde_json::to_vec(&encoder).unwrap();
    let loaded: FeatureEncoder = serde_json::from_slice(&persisted).unwrap();

    for (id, record) in catalog.iter() {
        assert_eq!(loaded.transform(record), matrix[id], "row {id} drifted");
    }
}

#[test]
fn test_browse_filters() {
    let catalog = create_test_catalog();

    let hollywood = FilterPipeline::new()
        .add_filter(IndustryContainsFilter::new("holly"))
        .apply(catalog.iter().collect());
    let titles: Vec<_> = hollywood.iter().map(|(_, r)| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Dune: Part Two", "Mystery Reel"]);

    let with_r = FilterPipeline::new()
        .add_filter(TitleContainsFilter::new("r"))
        .add_filter(IndustryContainsFilter::new("wood"))
        .apply(catalog.iter().collect());
    let ids: Vec<_> = with_r.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}
