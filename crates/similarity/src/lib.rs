//! # Similarity Crate
//!
//! Nearest-neighbour search over movie embeddings.
//!
//! ## Components
//!
//! ### EmbeddingIndex
//! Cosine top-K over an `EmbeddingMatrix` with precomputed row norms. The
//! scan runs in parallel; ranking uses a total order (score descending, row
//! id ascending) so results are reproducible.
//!
//! ### CatalogIndex
//! The catalog and its embeddings as one owned pair, checked at build time
//! to have the same number of rows.
//!
//! ### TitleResolver
//! Free-text title lookup through a pluggable `TitleMatcher`, with a
//! substring fallback.
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::{CatalogIndex, TitleResolver};
//!
//! let index = CatalogIndex::new(catalog, embeddings)?;
//! let hit = TitleResolver::default().resolve_title(index.catalog(), "Dune Part 2")?;
//! for neighbor in index.similar_to_row(hit.id, 5)? {
//!     println!("{:.3} {}", neighbor.score, neighbor.record.title);
//! }
//! ```

pub mod error;
pub mod matrix;
pub mod cosine;
pub mod index;
pub mod matcher;

// Re-export commonly used types
pub use cosine::{cosine_similarity, norm, EmbeddingIndex, ScoredRow};
pub use error::{Result, SimilarityError};
pub use index::{CatalogIndex, Neighbor};
pub use matcher::{
    MatchKind,
    MatcherKind,
    NormalizedLevenshtein,
    SequenceRatio,
    TitleMatch,
    TitleMatcher,
    TitleResolver,
    DEFAULT_MATCH_THRESHOLD,
};
pub use matrix::EmbeddingMatrix;
