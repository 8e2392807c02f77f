//! Service errors and their HTTP mapping.
//!
//! | variant          | status |
//! |------------------|--------|
//! | `NotReady`       | 503    |
//! | `NotFound`       | 404    |
//! | `InvalidRequest` | 400    |
//! | `Internal`       | 500    |
//!
//! Response bodies are `{"error": "..."}`. Internal errors are logged with
//! full detail and reported to the caller without it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use model::ModelError;
use serde::Serialize;
use similarity::SimilarityError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Artifacts are missing or failed to load
    #[error("System not ready: {0}")]
    NotReady(String),

    #[error("{0}")]
    NotFound(String),

    /// Bad query parameter (`k`, `page`, `limit`, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SimilarityError> for ServiceError {
    fn from(err: SimilarityError) -> Self {
        match err {
            SimilarityError::RowOutOfRange { id, .. } => {
                ServiceError::NotFound(format!("Movie {id} not found"))
            }
            SimilarityError::TitleNotFound(title) => {
                ServiceError::NotFound(format!("Movie '{title}' not found in catalog"))
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(err: ModelError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let message = match &self {
            ServiceError::Internal(detail) => {
                error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            ServiceError::NotReady(reason) => {
                error!("Request while not ready: {}", reason);
                "System not ready".to_string()
            }
            other => other.to_string(),
        };
        (self.status(), Json(ErrorResponse { error: message })).into_response()
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_errors_map_to_status() {
        let missing: ServiceError = SimilarityError::RowOutOfRange { id: 7, len: 3 }.into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.to_string(), "Movie 7 not found");

        let title: ServiceError = SimilarityError::TitleNotFound("Xyzzyx".to_string()).into();
        assert_eq!(title.status(), StatusCode::NOT_FOUND);

        let broken: ServiceError = SimilarityError::EmptyIndex.into();
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
