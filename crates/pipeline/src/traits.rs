//! Core traits for catalog browsing.
//!
//! This module defines the CatalogFilter trait that allows composable,
//! extensible filters to be applied to the catalog.

use data_loader::{MovieRecord, RowId};

/// A catalog row as seen by filters: its id plus a borrow of the record.
pub type CatalogEntry<'a> = (RowId, &'a MovieRecord);

/// Core trait for filtering catalog entries.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared across request handlers
/// - Filters take ownership of the Vec and return the survivors in the
///   original order, so pagination over the result stays stable
pub trait CatalogFilter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of entries.
    fn apply<'a>(&self, entries: Vec<CatalogEntry<'a>>) -> Vec<CatalogEntry<'a>>;
}
