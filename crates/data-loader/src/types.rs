//! Core domain types for the movie catalog.
//!
//! Key ideas:
//! - `MovieRecord` is the typed, default-filled form of one CSV row. Defaults
//!   are applied once at ingestion, never at query time.
//! - `RowId` is a position. Row `i` of the catalog is row `i` of the
//!   embeddings matrix, for the whole lifetime of a process.
//! - `Catalog` owns the rows and hands out borrows.

use serde::{Deserialize, Serialize};

use crate::error::{DataLoadError, Result};

// =============================================================================
// Identifiers and defaults
// =============================================================================

/// Positional identifier of a catalog row (and of its embedding row)
pub type RowId = usize;

/// Year used when no 4-digit year can be extracted from the source field
pub const DEFAULT_YEAR: i32 = 2000;

/// Genre list used when the source field is absent or empty
pub const DEFAULT_GENRE: &str = "Unknown";

/// Industry label used when the source field is absent or empty
pub const DEFAULT_INDUSTRY: &str = "Hollywood";

// =============================================================================
// Records
// =============================================================================

/// One movie after ingestion.
///
/// Every field is populated: optional source columns have already been
/// replaced by their defaults (`DEFAULT_YEAR`, `["Unknown"]`, `""`,
/// `DEFAULT_INDUSTRY`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub title: String,
    /// Four-digit release year
    pub year: i32,
    /// Genre labels in source order
    pub genre: Vec<String>,
    pub overview: String,
    pub industry: String,
}

/// A catalog row as persisted in the metadata table: the record plus its
/// explicit row index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub id: RowId,
    #[serde(flatten)]
    pub record: MovieRecord,
}

// =============================================================================
// Catalog
// =============================================================================

/// Ordered, immutable collection of movie records.
///
/// The catalog is built once (from the corpus at training time, or from the
/// persisted metadata table at serving time) and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub(crate) rows: Vec<MovieRecord>,
}

impl Catalog {
    /// Build a catalog from already-ingested records, keeping their order.
    pub fn from_records(rows: Vec<MovieRecord>) -> Self {
        Self { rows }
    }

    /// Rebuild a catalog from persisted rows.
    ///
    /// Fails if any row's `id` differs from its position.
    pub fn from_rows(rows: Vec<CatalogRow>) -> Result<Self> {
        let mut records = Vec::with_capacity(rows.len());
        for (position, row) in rows.into_iter().enumerate() {
            if row.id != position {
                return Err(DataLoadError::MisalignedRow {
                    position,
                    id: row.id,
                });
            }
            records.push(row.record);
        }
        Ok(Self { rows: records })
    }

    /// Persistable form of the catalog with explicit row ids.
    pub fn to_rows(&self) -> Vec<CatalogRow> {
        self.rows
            .iter()
            .enumerate()
            .map(|(id, record)| CatalogRow {
                id,
                record: record.clone(),
            })
            .collect()
    }

    /// Get a record by row id
    pub fn get(&self, id: RowId) -> Option<&MovieRecord> {
        self.rows.get(id)
    }

    /// All records in row order
    pub fn records(&self) -> &[MovieRecord] {
        &self.rows
    }

    /// Iterate over `(row id, record)` pairs in row order
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &MovieRecord)> {
        self.rows.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
