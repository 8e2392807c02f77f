//! The FilterPipeline chains catalog filters.
//!
//! This module provides the FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::traits::{CatalogEntry, CatalogFilter};
use tracing;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(TitleContainsFilter::new("part"))
///     .add_filter(IndustryContainsFilter::new("tolly"));
///
/// let entries = pipeline.apply(catalog.iter().collect());
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn CatalogFilter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl CatalogFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Add a filter only when `filter` is `Some`.
    ///
    /// Browse requests carry optional filters; this keeps the builder chain
    /// flat.
    pub fn add_optional(self, filter: Option<impl CatalogFilter + 'static>) -> Self {
        match filter {
            Some(filter) => self.add_filter(filter),
            None => self,
        }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence.
    pub fn apply<'a>(&self, entries: Vec<CatalogEntry<'a>>) -> Vec<CatalogEntry<'a>> {
        let mut current = entries;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current);
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
