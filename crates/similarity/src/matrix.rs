//! The embeddings matrix.

use crate::error::{Result, SimilarityError};
use serde::{Deserialize, Serialize};

/// Dense `rows × dim` matrix of embeddings, one row per catalog row.
///
/// Rows are stored exactly as the encoder produced them; nothing here
/// renormalizes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct EmbeddingMatrix {
    rows: usize,
    dim: usize,
    data: Vec<Vec<f32>>,
}

/// Unchecked persisted form
#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    dim: usize,
    data: Vec<Vec<f32>>,
}

impl TryFrom<RawMatrix> for EmbeddingMatrix {
    type Error = SimilarityError;

    fn try_from(raw: RawMatrix) -> Result<Self> {
        let matrix = Self::from_rows(raw.data, raw.dim)?;
        if matrix.rows != raw.rows {
            return Err(SimilarityError::Misaligned {
                catalog_rows: raw.rows,
                embedding_rows: matrix.rows,
            });
        }
        Ok(matrix)
    }
}

impl EmbeddingMatrix {
    /// Build a matrix, checking every row has `dim` entries
    pub fn from_rows(data: Vec<Vec<f32>>, dim: usize) -> Result<Self> {
        if let Some((row, bad)) = data.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(SimilarityError::RaggedMatrix {
                row,
                expected: dim,
                actual: bad.len(),
            });
        }
        Ok(Self {
            rows: data.len(),
            dim,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, id: usize) -> Option<&[f32]> {
        self.data.get(id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.data.iter().map(Vec::as_slice)
    }

    pub(crate) fn data(&self) -> &[Vec<f32>] {
        &self.data
    }
}
