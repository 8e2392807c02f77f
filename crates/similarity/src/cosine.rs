//! Cosine top-K search over an embeddings matrix.
//!
//! ## Algorithm
//! 1. Skip when the query norm is zero (cosine is undefined): empty result
//! 2. Score every row in parallel: `dot(E_i, q) / (||E_i|| * ||q||)`
//! 3. Drop the excluded row and rows with zero norm
//! 4. Select the top K under a total order: score descending, row id
//!    ascending, so equal scores keep catalog order and output is identical
//!    across runs

use crate::error::{Result, SimilarityError};
use crate::matrix::EmbeddingMatrix;
use data_loader::RowId;
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// One search hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRow {
    pub id: RowId,
    pub score: f32,
}

/// L2 norm
pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity, `None` when either vector has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    let denom = norm(a) * norm(b);
    (denom > 0.0).then(|| dot(a, b) / denom)
}

/// Ranking order: higher score first, then lower id
fn rank_order(a: &ScoredRow, b: &ScoredRow) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}

/// Embeddings matrix with precomputed row norms.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    matrix: EmbeddingMatrix,
    norms: Vec<f32>,
}

impl EmbeddingIndex {
    pub fn new(matrix: EmbeddingMatrix) -> Self {
        let norms: Vec<f32> = matrix.data().par_iter().map(|r| norm(r)).collect();

        let degenerate = norms.iter().filter(|n| !(**n > 0.0)).count();
        if degenerate > 0 {
            warn!(
                "{} of {} embedding rows have zero norm and will never be returned",
                degenerate,
                norms.len()
            );
        }
        Self { matrix, norms }
    }

    pub fn matrix(&self) -> &EmbeddingMatrix {
        &self.matrix
    }

    pub fn len(&self) -> usize {
        self.matrix.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.rows() == 0
    }

    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    pub fn embedding(&self, id: RowId) -> Result<&[f32]> {
        self.matrix.row(id).ok_or(SimilarityError::RowOutOfRange {
            id,
            len: self.len(),
        })
    }

    /// Top `k` rows by cosine similarity to `query`, never including
    /// `exclude`.
    pub fn top_k(&self, query: &[f32], k: usize, exclude: Option<RowId>) -> Result<Vec<ScoredRow>> {
        if query.len() != self.dim() {
            return Err(SimilarityError::DimensionMismatch {
                expected: self.dim(),
                actual: query.len(),
            });
        }

        let query_norm = norm(query);
        if !(query_norm > 0.0) || !query_norm.is_finite() || k == 0 {
            debug!("Degenerate query (norm {}), returning no rows", query_norm);
            return Ok(Vec::new());
        }

        let mut scored: Vec<ScoredRow> = self
            .matrix
            .data()
            .par_iter()
            .zip(self.norms.par_iter())
            .enumerate()
            .filter_map(|(id, (row, row_norm))| {
                if Some(id) == exclude || !(*row_norm > 0.0) {
                    return None;
                }
                let score = dot(row, query) / (row_norm * query_norm);
                score.is_finite().then_some(ScoredRow { id, score })
            })
            .collect();

        if scored.len() > k {
            scored.select_nth_unstable_by(k - 1, rank_order);
            scored.truncate(k);
        }
        scored.sort_by(rank_order);
        Ok(scored)
    }

    /// Top `k` neighbours of a stored row, excluding the row itself
    pub fn top_k_for_row(&self, id: RowId, k: usize) -> Result<Vec<ScoredRow>> {
        let query = self.embedding(id)?;
        self.top_k(query, k, Some(id))
    }
}
