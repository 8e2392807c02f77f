//! Serving layer for the neural movie recommender.
//!
//! - `context`: the immutable state loaded from an artifact directory
//! - `service`: the query facade (browse, recommend by id/title/plot)
//! - `routes`: the axum router over the service
//! - `error`: service errors and their HTTP status mapping

pub mod context;
pub mod error;
pub mod routes;
pub mod service;

pub use context::{ColdRecord, ServingContext, DEFAULT_COLD_YEAR};
pub use error::{ErrorResponse, Result, ServiceError};
pub use routes::{router, AppState};
pub use service::{CatalogPage, CatalogQuery, MovieView, RecommendationService, ServiceConfig};
