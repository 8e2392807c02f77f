//! Integration tests for the catalog index.

use data_loader::{Catalog, MovieRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use similarity::{CatalogIndex, EmbeddingMatrix, SimilarityError, TitleResolver};

fn create_catalog(n: usize) -> Catalog {
    Catalog::from_records(
        (0..n)
            .map(|i| MovieRecord {
                title: format!("Movie {i}"),
                year: 2000 + i as i32,
                genre: vec!["Drama".to_string()],
                overview: String::new(),
                industry: "Hollywood".to_string(),
            })
            .collect(),
    )
}

fn random_matrix(rows: usize, dim: usize, seed: u64) -> EmbeddingMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..rows)
        .map(|_| (0..dim).map(|_| rng.random_range(-1.0f32..1.0)).collect())
        .collect();
    EmbeddingMatrix::from_rows(data, dim).unwrap()
}

#[test]
fn test_similar_to_row_properties() {
    let index = CatalogIndex::new(create_catalog(50), random_matrix(50, 16, 7)).unwrap();

    for id in [0, 13, 49] {
        for k in [1, 5, 49, 100] {
            let hits = index.similar_to_row(id, k).unwrap();

            assert_eq!(hits.len(), k.min(49));
            assert!(hits.iter().all(|h| h.id != id));
            assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }
}

#[test]
fn test_similar_to_row_is_idempotent() {
    let index = CatalogIndex::new(create_catalog(40), random_matrix(40, 8, 11)).unwrap();

    let first = index.similar_to_row(3, 10).unwrap();
    let second = index.similar_to_row(3, 10).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_similar_to_vector_has_no_exclusion() {
    let matrix = random_matrix(20, 8, 3);
    let query = matrix.row(5).unwrap().to_vec();
    let index = CatalogIndex::new(create_catalog(20), matrix).unwrap();

    let hits = index.similar_to_vector(&query, 3).unwrap();
    assert_eq!(hits[0].id, 5);
    assert!((hits[0].score - 1.0).abs() < 1e-5);

    assert!(index.similar_to_vector(&[0.0; 8], 3).unwrap().is_empty());
}

#[test]
fn test_misaligned_pair_rejected() {
    let err = CatalogIndex::new(create_catalog(3), random_matrix(4, 8, 1)).unwrap_err();
    assert_eq!(
        err,
        SimilarityError::Misaligned { catalog_rows: 3, embedding_rows: 4 }
    );

    let out_of_range = CatalogIndex::new(create_catalog(4), random_matrix(4, 8, 1))
        .unwrap()
        .similar_to_row(4, 2)
        .unwrap_err();
    assert_eq!(out_of_range, SimilarityError::RowOutOfRange { id: 4, len: 4 });
}

#[test]
fn test_resolve_then_search() {
    let index = CatalogIndex::new(create_catalog(10), random_matrix(10, 8, 5)).unwrap();
    let hit = TitleResolver::default()
        .resolve_title(index.catalog(), "movie 7")
        .unwrap();

    assert_eq!(hit.id, 7);
    let neighbors = index.similar_to_row(hit.id, 3).unwrap();
    assert!(neighbors.iter().all(|n| n.record.title != "Movie 7"));
}
