//! Recommendation service.
//!
//! The facade every entry point (HTTP handlers, CLI) calls. It is loaded once
//! at startup and is either ready, holding an immutable `ServingContext`, or
//! not ready, holding the reason. A service that failed to load keeps
//! answering: every query reports `NotReady` instead of crashing.

use crate::context::{ColdRecord, ServingContext};
use crate::error::{Result, ServiceError};
use data_loader::{MovieRecord, RowId};
use model::ArtifactSet;
use pipeline::{FilterPipeline, IndustryContainsFilter, TitleContainsFilter};
use serde::{Deserialize, Serialize};
use similarity::{MatchKind, MatcherKind, Neighbor, TitleResolver, DEFAULT_MATCH_THRESHOLD};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Serving knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub matcher: MatcherKind,
    /// Minimum fuzzy score a title match must reach
    pub match_threshold: f64,
    pub default_k_by_id: usize,
    pub default_k_by_title: usize,
    pub default_k_by_plot: usize,
    pub default_page_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherKind::default(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            default_k_by_id: 10,
            default_k_by_title: 5,
            default_k_by_plot: 5,
            default_page_limit: 20,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(ServiceError::InvalidRequest(format!(
                "match threshold must be in [0, 1], got {}",
                self.match_threshold
            )));
        }
        for (name, value) in [
            ("default_k_by_id", self.default_k_by_id),
            ("default_k_by_title", self.default_k_by_title),
            ("default_k_by_plot", self.default_k_by_plot),
            ("default_page_limit", self.default_page_limit),
        ] {
            if value == 0 {
                return Err(ServiceError::InvalidRequest(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }

    pub fn resolver(&self) -> TitleResolver {
        TitleResolver::new(self.matcher.build(), self.match_threshold)
    }
}

/// Browse parameters. Empty filter strings are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub industry: Option<String>,
}

/// One page of the (filtered) catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    /// Rows matching the filters, across all pages
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub rows: Vec<MovieView>,
}

/// A catalog row as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieView {
    pub id: RowId,
    pub title: String,
    pub year: i32,
    pub genre: Vec<String>,
    pub overview: String,
    pub industry: String,
    /// Similarity to the query; `null` when browsing or not a finite number
    #[serde(default)]
    pub score: Option<f32>,
}

impl MovieView {
    fn from_record(id: RowId, record: &MovieRecord, score: Option<f32>) -> Self {
        Self {
            id,
            title: record.title.clone(),
            year: record.year,
            genre: record.genre.clone(),
            overview: record.overview.clone(),
            industry: record.industry.clone(),
            score: score.filter(|s| s.is_finite()),
        }
    }

    fn from_neighbor(neighbor: &Neighbor<'_>) -> Self {
        Self::from_record(neighbor.id, neighbor.record, Some(neighbor.score))
    }
}

enum ServiceState {
    Ready(Arc<ServingContext>),
    NotReady { reason: String },
}

pub struct RecommendationService {
    state: ServiceState,
    config: ServiceConfig,
}

impl RecommendationService {
    /// Load artifacts from `dir`.
    ///
    /// Never fails: a missing or inconsistent artifact set leaves the service
    /// in the not-ready state and is logged.
    #[instrument(skip(config))]
    pub fn load(dir: &Path, config: ServiceConfig) -> Self {
        if let Err(err) = config.validate() {
            error!("Invalid service configuration: {}", err);
            return Self::not_ready(err.to_string(), config);
        }

        match ServingContext::load(dir, config.resolver()) {
            Ok(context) => {
                info!(
                    "Service ready: {} movies, matcher {:?} (threshold {})",
                    context.index().len(),
                    config.matcher,
                    config.match_threshold
                );
                Self::ready(Arc::new(context), config)
            }
            Err(err) => {
                error!("Failed to load artifacts from {}: {}", dir.display(), err);
                Self::not_ready(err.to_string(), config)
            }
        }
    }

    /// Serve an in-memory artifact set (e.g. straight after training)
    pub fn from_artifacts(artifacts: ArtifactSet, config: ServiceConfig) -> Self {
        match ServingContext::from_artifacts(artifacts, config.resolver()) {
            Ok(context) => Self::ready(Arc::new(context), config),
            Err(err) => {
                error!("Artifact set rejected: {}", err);
                Self::not_ready(err.to_string(), config)
            }
        }
    }

    pub fn ready(context: Arc<ServingContext>, config: ServiceConfig) -> Self {
        Self {
            state: ServiceState::Ready(context),
            config,
        }
    }

    pub fn not_ready(reason: impl Into<String>, config: ServiceConfig) -> Self {
        Self {
            state: ServiceState::NotReady {
                reason: reason.into(),
            },
            config,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ServiceState::Ready(_))
    }

    /// Shared handle to the loaded context
    pub fn context(&self) -> Result<&Arc<ServingContext>> {
        match &self.state {
            ServiceState::Ready(context) => Ok(context),
            ServiceState::NotReady { reason } => Err(ServiceError::NotReady(reason.clone())),
        }
    }

    /// Filtered, paginated catalog browse
    #[instrument(skip(self))]
    pub fn list_catalog(&self, query: &CatalogQuery) -> Result<CatalogPage> {
        let context = self.context()?;
        let page = positive("page", query.page.unwrap_or(1))?;
        let limit = positive("limit", query.limit.unwrap_or(self.config.default_page_limit))?;

        let pipeline = FilterPipeline::new()
            .add_optional(non_blank(&query.search).map(TitleContainsFilter::new))
            .add_optional(non_blank(&query.industry).map(IndustryContainsFilter::new));

        let matched = pipeline.apply(context.index().catalog().iter().collect());
        let total = matched.len();
        let offset = (page - 1).saturating_mul(limit);

        let rows = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(id, record)| MovieView::from_record(id, record, None))
            .collect();

        Ok(CatalogPage {
            total,
            page,
            limit,
            rows,
        })
    }

    /// Nearest catalog rows to row `id`, excluding `id` itself
    #[instrument(skip(self))]
    pub fn recommend_by_id(&self, id: RowId, k: Option<usize>) -> Result<Vec<MovieView>> {
        let context = self.context()?;
        let k = positive("k", k.unwrap_or(self.config.default_k_by_id))?;

        let neighbors = context.similar_to_row(id, k)?;
        Ok(neighbors.iter().map(MovieView::from_neighbor).collect())
    }

    /// Resolve a free-text title, then recommend from the resolved row
    #[instrument(skip(self))]
    pub fn recommend_by_title(&self, title: &str, k: Option<usize>) -> Result<Vec<String>> {
        let context = self.context()?;
        let k = positive("k", k.unwrap_or(self.config.default_k_by_title))?;

        let matched = context.resolve_title(title)?;
        match matched.kind {
            MatchKind::Fuzzy { score } => debug!("'{}' matched row {} ({:.3})", title, matched.id, score),
            MatchKind::Substring => debug!("'{}' matched row {} by substring", title, matched.id),
        }

        let neighbors = context.similar_to_row(matched.id, k)?;
        Ok(titles(&neighbors))
    }

    /// Recommend from a movie that is not in the catalog
    #[instrument(skip(self, record))]
    pub fn recommend_by_cold_record(&self, record: &ColdRecord, k: Option<usize>) -> Result<Vec<String>> {
        let context = self.context()?;
        let k = positive("k", k.unwrap_or(self.config.default_k_by_plot))?;

        let neighbors = context.similar_to_cold(record, k)?;
        Ok(titles(&neighbors))
    }
}

fn positive(name: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(ServiceError::InvalidRequest(format!("{name} must be at least 1")));
    }
    Ok(value)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn titles(neighbors: &[Neighbor<'_>]) -> Vec<String> {
    neighbors.iter().map(|n| n.record.title.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServiceConfig::default();
        config.validate().unwrap();
        assert_eq!(config.default_k_by_id, 10);
        assert_eq!(config.default_k_by_title, 5);
        assert_eq!(config.default_page_limit, 20);
        assert_eq!(config.resolver().threshold(), 0.6);
    }

    #[test]
    fn test_bad_threshold_rejected() {
        let config = ServiceConfig {
            match_threshold: 1.5,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_not_ready_reports_on_every_entry_point() {
        let service = RecommendationService::not_ready("no artifacts", ServiceConfig::default());
        assert!(!service.is_ready());

        let not_ready = |err: ServiceError| matches!(err, ServiceError::NotReady(_));
        assert!(not_ready(service.list_catalog(&CatalogQuery::default()).unwrap_err()));
        assert!(not_ready(service.recommend_by_id(0, None).unwrap_err()));
        assert!(not_ready(service.recommend_by_title("RRR", None).unwrap_err()));

        let record = ColdRecord {
            title: None,
            overview: "A heist.".to_string(),
            year: 2024,
            genres: vec![],
        };
        assert!(not_ready(service.recommend_by_cold_record(&record, None).unwrap_err()));
    }

    #[test]
    fn test_load_from_missing_dir_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let service = RecommendationService::load(&dir.path().join("missing"), ServiceConfig::default());
        assert!(!service.is_ready());
    }

    #[test]
    fn test_score_nan_becomes_absent() {
        let record = MovieRecord {
            title: "RRR".to_string(),
            year: 2022,
            genre: vec!["Action".to_string()],
            overview: String::new(),
            industry: "Tollywood".to_string(),
        };
        let view = MovieView::from_record(0, &record, Some(f32::NAN));
        assert_eq!(view.score, None);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json["score"].is_null());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(&Some("  ".to_string())), None);
        assert_eq!(non_blank(&Some(" dune ".to_string())), Some("dune"));
        assert_eq!(non_blank(&None), None);
    }
}
