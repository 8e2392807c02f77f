//! HTTP surface.
//!
//! | method | path                  |
//! |--------|-----------------------|
//! | GET    | `/health`             |
//! | GET    | `/movies`             |
//! | GET    | `/recommend/{movie_id}` |
//! | GET    | `/recommend_by_title` |
//! | POST   | `/recommend_by_plot`  |
//!
//! Queries are CPU-bound scans, so handlers move them onto the blocking pool.

use crate::context::ColdRecord;
use crate::error::{Result, ServiceError};
use crate::service::{CatalogPage, CatalogQuery, MovieView, RecommendationService};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub type AppState = Arc<RecommendationService>;

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/movies", get(list_movies))
        .route("/recommend/{movie_id}", get(recommend_by_id))
        .route("/recommend_by_title", get(recommend_by_title))
        .route("/recommend_by_plot", post(recommend_by_plot))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct KQuery {
    pub k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
    pub k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PlotRequest {
    #[serde(flatten)]
    pub record: ColdRecord,
    pub k: Option<usize>,
}

/// Run a service call on the blocking pool
async fn blocking<T, F>(service: AppState, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&RecommendationService) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(service.as_ref()))
        .await
        .map_err(|err| ServiceError::Internal(format!("query task failed: {err}")))?
}

async fn health(State(service): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if service.is_ready() {
        (StatusCode::OK, Json(HealthResponse { status: "ready" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "not ready" }),
        )
    }
}

async fn list_movies(
    State(service): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogPage>> {
    let page = blocking(service, move |s| s.list_catalog(&query)).await?;
    Ok(Json(page))
}

async fn recommend_by_id(
    State(service): State<AppState>,
    Path(movie_id): Path<i64>,
    Query(query): Query<KQuery>,
) -> Result<Json<Vec<MovieView>>> {
    let id = usize::try_from(movie_id)
        .map_err(|_| ServiceError::NotFound(format!("Movie {movie_id} not found")))?;
    let rows = blocking(service, move |s| s.recommend_by_id(id, query.k)).await?;
    Ok(Json(rows))
}

async fn recommend_by_title(
    State(service): State<AppState>,
    Query(query): Query<TitleQuery>,
) -> Result<Json<Vec<String>>> {
    let titles = blocking(service, move |s| s.recommend_by_title(&query.title, query.k)).await?;
    Ok(Json(titles))
}

async fn recommend_by_plot(
    State(service): State<AppState>,
    Json(request): Json<PlotRequest>,
) -> Result<Json<Vec<String>>> {
    let titles = blocking(service, move |s| {
        s.recommend_by_cold_record(&request.record, request.k)
    })
    .await?;
    Ok(Json(titles))
}
