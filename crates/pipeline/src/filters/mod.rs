//! Filter implementations for catalog browsing.
//!
//! This module contains the concrete filters that can be composed into a
//! FilterPipeline.

pub mod industry;
pub mod title;

// Re-export for convenience
pub use industry::IndustryContainsFilter;
pub use title::TitleContainsFilter;

/// Case-insensitive substring test shared by the filters
pub(crate) fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
