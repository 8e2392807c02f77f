//! # Data Loader Crate
//!
//! This crate ingests the merged movie corpus and owns the catalog types that
//! every other crate in the workspace reads.
//!
//! ## Main Components
//!
//! - **types**: `MovieRecord`, `CatalogRow`, `Catalog`, `RowId`
//! - **parser**: CSV parsing with default-filling for sparse rows
//! - **index**: catalog building (dedup, validation)
//! - **error**: error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Catalog;
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_csv(Path::new("data/movies.csv"))?;
//! let first = catalog.get(0).unwrap();
//! println!("{} ({}) [{}]", first.title, first.year, first.genre.join(", "));
//! ```
//!
//! ## Ingestion rules
//!
//! Defaults are applied exactly once, here. Downstream code (feature
//! encoding, serving) can rely on every field of a `MovieRecord` being
//! populated.

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::dedup_by_title;
pub use parser::{extract_year, parse_genre_list};
pub use types::{
    Catalog,
    CatalogRow,
    MovieRecord,
    RowId,
    DEFAULT_GENRE,
    DEFAULT_INDUSTRY,
    DEFAULT_YEAR,
};
