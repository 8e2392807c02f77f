//! Filter to browse by film industry.

use super::contains_ignore_case;
use crate::traits::{CatalogEntry, CatalogFilter};

/// Keeps entries whose industry label contains the given text, ignoring
/// case ("wood" matches every "...wood" industry).
pub struct IndustryContainsFilter {
    needle: String,
}

impl IndustryContainsFilter {
    pub fn new(industry: impl AsRef<str>) -> Self {
        Self {
            needle: industry.as_ref().to_lowercase(),
        }
    }
}

impl CatalogFilter for IndustryContainsFilter {
    fn name(&self) -> &str {
        "IndustryContainsFilter"
    }

    fn apply<'a>(&self, entries: Vec<CatalogEntry<'a>>) -> Vec<CatalogEntry<'a>> {
        entries
            .into_iter()
            .filter(|(_, record)| contains_ignore_case(&record.industry, &self.needle))
            .collect()
    }
}
