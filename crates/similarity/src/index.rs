//! Catalog rows paired with their embeddings.
//!
//! `CatalogIndex` owns both halves and refuses to exist unless they line up
//! row for row: catalog row `i` is embedding row `i`.

use crate::cosine::{EmbeddingIndex, ScoredRow};
use crate::error::{Result, SimilarityError};
use crate::matrix::EmbeddingMatrix;
use data_loader::{Catalog, MovieRecord, RowId};
use tracing::{info, instrument};

/// A search hit joined with its catalog record
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<'a> {
    pub id: RowId,
    pub score: f32,
    pub record: &'a MovieRecord,
}

/// Immutable, index-aligned catalog + embeddings
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    catalog: Catalog,
    embeddings: EmbeddingIndex,
}

impl CatalogIndex {
    /// Pair a catalog with its embeddings matrix.
    ///
    /// Fails when the row counts differ or the catalog is empty.
    pub fn new(catalog: Catalog, matrix: EmbeddingMatrix) -> Result<Self> {
        if catalog.len() != matrix.rows() {
            return Err(SimilarityError::Misaligned {
                catalog_rows: catalog.len(),
                embedding_rows: matrix.rows(),
            });
        }
        if catalog.is_empty() {
            return Err(SimilarityError::EmptyIndex);
        }

        info!(
            "Built catalog index: {} rows × {} dims",
            matrix.rows(),
            matrix.dim()
        );
        Ok(Self {
            catalog,
            embeddings: EmbeddingIndex::new(matrix),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn embeddings(&self) -> &EmbeddingIndex {
        &self.embeddings
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn record(&self, id: RowId) -> Result<&MovieRecord> {
        self.catalog.get(id).ok_or(SimilarityError::RowOutOfRange {
            id,
            len: self.len(),
        })
    }

    /// Neighbours of a catalog row, never including the row itself
    #[instrument(skip(self))]
    pub fn similar_to_row(&self, id: RowId, k: usize) -> Result<Vec<Neighbor<'_>>> {
        let hits = self.embeddings.top_k_for_row(id, k)?;
        Ok(self.join(hits))
    }

    /// Neighbours of an arbitrary query embedding (cold records)
    pub fn similar_to_vector(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor<'_>>> {
        let hits = self.embeddings.top_k(query, k, None)?;
        Ok(self.join(hits))
    }

    fn join(&self, hits: Vec<ScoredRow>) -> Vec<Neighbor<'_>> {
        hits.into_iter()
            .filter_map(|hit| {
                self.catalog.get(hit.id).map(|record| Neighbor {
                    id: hit.id,
                    score: hit.score,
                    record,
                })
            })
            .collect()
    }
}
