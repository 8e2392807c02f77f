//! Catalog building from the raw corpus.
//!
//! This module turns parsed corpus rows into a `Catalog`:
//! - Parse the CSV (defaults already applied by the parser)
//! - Drop duplicate titles, keeping the last occurrence
//! - Reject an empty result

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::{Catalog, MovieRecord};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

impl Catalog {
    /// Load and ingest the corpus CSV at `path`.
    ///
    /// Steps:
    /// 1. Parse the CSV, filling defaults for sparse rows
    /// 2. Deduplicate by title (last occurrence wins)
    /// 3. Validate the catalog is not empty
    pub fn load_from_csv(path: &Path) -> Result<Self> {
        info!("Loading movie corpus from {:?}", path);

        let records = parser::parse_corpus(path)?;
        let parsed = records.len();
        let catalog = Catalog::from_records(dedup_by_title(records));

        info!(
            "Loaded {} movies ({} duplicate titles dropped)",
            catalog.len(),
            parsed - catalog.len()
        );

        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate that the catalog can be trained on or served
    pub fn validate(&self) -> Result<()> {
        if self.rows.is_empty() {
            return Err(DataLoadError::EmptyCorpus(
                "no titled rows after ingestion".to_string(),
            ));
        }
        Ok(())
    }
}

/// Keep only the last row for each title, preserving relative order of the
/// surviving rows.
pub fn dedup_by_title(records: Vec<MovieRecord>) -> Vec<MovieRecord> {
    let mut last_seen: HashMap<&str, usize> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        last_seen.insert(record.title.as_str(), idx);
    }

    let keep: Vec<bool> = records
        .iter()
        .enumerate()
        .map(|(idx, r)| last_seen.get(r.title.as_str()) == Some(&idx))
        .collect();

    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn record(title: &str, year: i32) -> MovieRecord {
        MovieRecord {
            title: title.to_string(),
            year,
            genre: vec!["Drama".to_string()],
            overview: String::new(),
            industry: "Hollywood".to_string(),
        }
    }

    #[test]
    fn test_dedup_keeps_last_occurrence() {
        let records = vec![
            record("Leo", 2015),
            record("Jawan", 2023),
            record("Leo", 2023),
            record("Animal", 2023),
        ];

        let deduped = dedup_by_title(records);
        let titles: Vec<_> = deduped.iter().map(|r| r.title.as_str()).collect();

        assert_eq!(titles, vec!["Jawan", "Leo", "Animal"]);
        assert_eq!(deduped[1].year, 2023);
    }

    #[test]
    fn test_load_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "title,year,genre,overview,industry").unwrap();
        writeln!(file, "Kantara,2022,\"Action, Thriller\",A tribal legend.,Sandalwood").unwrap();
        writeln!(file, "Kantara,2022,Action,Duplicate.,Sandalwood").unwrap();
        writeln!(file, "Drishyam,2013,Crime,A family secret.,Mollywood").unwrap();

        let catalog = Catalog::load_from_csv(file.path()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().overview, "Duplicate.");
        assert_eq!(catalog.get(1).unwrap().title, "Drishyam");
    }

    #[test]
    fn test_load_empty_corpus_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "title,year,genre,overview,industry").unwrap();

        let err = Catalog::load_from_csv(file.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::EmptyCorpus(_)));
    }
}
