//! Filter to browse by title.

use super::contains_ignore_case;
use crate::traits::{CatalogEntry, CatalogFilter};

/// Keeps entries whose title contains the search text, ignoring case.
pub struct TitleContainsFilter {
    needle: String,
}

impl TitleContainsFilter {
    pub fn new(search: impl AsRef<str>) -> Self {
        Self {
            needle: search.as_ref().to_lowercase(),
        }
    }
}

impl CatalogFilter for TitleContainsFilter {
    fn name(&self) -> &str {
        "TitleContainsFilter"
    }

    fn apply<'a>(&self, entries: Vec<CatalogEntry<'a>>) -> Vec<CatalogEntry<'a>> {
        entries
            .into_iter()
            .filter(|(_, record)| contains_ignore_case(&record.title, &self.needle))
            .collect()
    }
}
