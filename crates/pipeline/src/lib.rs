//! Feature encoding and catalog browsing for movie records.
//!
//! This crate provides:
//! - `FeatureEncoder` which turns a movie record into the fixed-width vector
//!   the autoencoder is trained on (genre multi-hot, TF-IDF text, scaled year)
//! - `CatalogFilter` trait and implementations for browsing the catalog
//! - `FilterPipeline` for composing filters
//!
//! ## Architecture
//! Encoding happens in two phases:
//! 1. `FeatureEncoder::fit` runs once over the whole corpus and fixes every
//!    vocabulary, weight and range
//! 2. `FeatureEncoder::transform` is called for each record afterwards (the
//!    training matrix as well as cold records at serving time) and never
//!    learns anything new
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FeatureEncoder, FilterPipeline};
//! use pipeline::filters::*;
//!
//! let encoder = FeatureEncoder::fit(catalog.records(), 2000)?;
//! let matrix = encoder.transform_batch(catalog.records());
//!
//! let browse = FilterPipeline::new()
//!     .add_filter(TitleContainsFilter::new("dune"))
//!     .add_filter(IndustryContainsFilter::new("holly"));
//! let entries = browse.apply(catalog.iter().collect());
//! ```

pub mod error;
pub mod text;
pub mod features;
pub mod traits;
pub mod filters;
pub mod filter_pipeline;

// Re-export main types
pub use error::{FeatureError, Result};
pub use features::{
    FeatureEncoder,
    FeatureLayout,
    GenreBinarizer,
    TfidfVectorizer,
    YearScaler,
    DEFAULT_MAX_TEXT_FEATURES,
};
pub use filter_pipeline::FilterPipeline;
pub use filters::{IndustryContainsFilter, TitleContainsFilter};
pub use traits::{CatalogEntry, CatalogFilter};
