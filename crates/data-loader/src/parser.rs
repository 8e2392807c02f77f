//! Parser for the merged movie corpus CSV.
//!
//! Expected header: `title,year,genre,overview,industry`. Every column but
//! `title` may be missing or empty; missing values are coerced:
//!
//! | column     | rule                                               |
//! |------------|----------------------------------------------------|
//! | `year`     | first run of 4 digits, else `2000`                 |
//! | `genre`    | comma-separated labels, trimmed; empty → `Unknown` |
//! | `overview` | empty → `""`                                       |
//! | `industry` | empty → `Hollywood`                                |
//!
//! Rows without a title cannot be keyed or matched and are skipped.

use crate::error::{DataLoadError, Result};
use crate::types::{DEFAULT_GENRE, DEFAULT_INDUSTRY, DEFAULT_YEAR, MovieRecord};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// One CSV row exactly as it appears in the file.
///
/// `#[serde(default)]` lets the corpus omit whole columns.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMovieRow {
    title: Option<String>,
    year: Option<String>,
    genre: Option<String>,
    overview: Option<String>,
    industry: Option<String>,
}

/// Parse the corpus file at `path`.
///
/// Returns `FileNotFound` when the file does not exist, so a training run can
/// abort before doing any work.
pub fn parse_corpus(path: &Path) -> Result<Vec<MovieRecord>> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let file = std::fs::File::open(path)?;
    parse_corpus_reader(file)
}

/// Parse corpus CSV from any reader
pub fn parse_corpus_reader<R: Read>(reader: R) -> Result<Vec<MovieRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in csv_reader.deserialize::<RawMovieRow>() {
        let raw = result?;
        match normalize_row(raw) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} corpus rows without a title", skipped);
    }
    debug!("Parsed {} corpus rows", records.len());
    Ok(records)
}

/// Apply the ingestion defaults to one raw row
fn normalize_row(raw: RawMovieRow) -> Option<MovieRecord> {
    let title = non_empty(raw.title)?;
    Some(MovieRecord {
        title,
        year: raw
            .year
            .as_deref()
            .and_then(extract_year)
            .unwrap_or(DEFAULT_YEAR),
        genre: parse_genre_list(raw.genre.as_deref().unwrap_or("")),
        overview: raw.overview.unwrap_or_default(),
        industry: non_empty(raw.industry).unwrap_or_else(|| DEFAULT_INDUSTRY.to_string()),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract the first run of four ASCII digits
///
/// Example: "2015"      -> Some(2015)
///          "(1999 I)"  -> Some(1999)
///          "2015.0"    -> Some(2015)
///          "TBA"       -> None
pub fn extract_year(raw: &str) -> Option<i32> {
    let bytes = raw.as_bytes();
    bytes
        .windows(4)
        .find(|w| w.iter().all(u8::is_ascii_digit))
        .map(|w| {
            w.iter()
                .fold(0i32, |acc, &b| acc * 10 + i32::from(b - b'0'))
        })
}

/// Split a comma-separated genre field into trimmed labels
///
/// Example: "Action, Drama" -> ["Action", "Drama"]
///          ""              -> ["Unknown"]
pub fn parse_genre_list(raw: &str) -> Vec<String> {
    let genres: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect();

    if genres.is_empty() {
        vec![DEFAULT_GENRE.to_string()]
    } else {
        genres
    }
}
