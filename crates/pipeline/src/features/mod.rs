//! Feature encoding for movie records.
//!
//! A feature vector is the concatenation
//! `[genre multi-hot | TF-IDF overview | scaled year]`. The width of each
//! block is fixed by `fit` and recorded in the persisted encoder state, so a
//! vector built at serving time always lines up with the vectors the model
//! was trained on.

pub mod genre;
pub mod tfidf;
pub mod year;

pub use genre::GenreBinarizer;
pub use tfidf::TfidfVectorizer;
pub use year::YearScaler;

use crate::error::{FeatureError, Result};
use data_loader::MovieRecord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Number of overview terms kept when no limit is configured
pub const DEFAULT_MAX_TEXT_FEATURES: usize = 2000;

/// Column ranges of each block inside a feature vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    pub genre: std::ops::Range<usize>,
    pub text: std::ops::Range<usize>,
    pub year: usize,
}

/// The fitted encoder triple.
///
/// Immutable after `fit`: it is persisted next to the model and loaded as-is
/// at serving time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    genres: GenreBinarizer,
    text: TfidfVectorizer,
    year: YearScaler,
}

impl FeatureEncoder {
    /// Fit all three sub-encoders over the full corpus.
    #[instrument(skip(records), fields(rows = records.len()))]
    pub fn fit(records: &[MovieRecord], max_text_features: usize) -> Result<Self> {
        if max_text_features == 0 {
            return Err(FeatureError::InvalidFeatureLimit(max_text_features));
        }
        let year = YearScaler::fit(records.iter().map(|r| r.year))
            .ok_or(FeatureError::EmptyCorpus)?;

        let genres = GenreBinarizer::fit(records.iter().map(|r| r.genre.as_slice()));
        let text = TfidfVectorizer::fit(
            records.iter().map(|r| r.overview.as_str()),
            max_text_features,
        );

        let encoder = Self { genres, text, year };
        info!(
            "Fitted feature encoder: {} genres, {} text terms, years {}..={} (width {})",
            encoder.genres.width(),
            encoder.text.width(),
            year.min,
            year.max,
            encoder.width()
        );
        Ok(encoder)
    }

    /// Width of every vector this encoder produces
    pub fn width(&self) -> usize {
        self.genres.width() + self.text.width() + 1
    }

    pub fn layout(&self) -> FeatureLayout {
        let g = self.genres.width();
        let t = self.text.width();
        FeatureLayout {
            genre: 0..g,
            text: g..g + t,
            year: g + t,
        }
    }

    pub fn genres(&self) -> &GenreBinarizer {
        &self.genres
    }

    pub fn text(&self) -> &TfidfVectorizer {
        &self.text
    }

    pub fn year(&self) -> &YearScaler {
        &self.year
    }

    /// Encode raw fields. Used directly for cold records.
    pub fn encode(&self, genres: &[String], overview: &str, year: i32) -> Vec<f32> {
        let layout = self.layout();
        let mut out = vec![0.0; self.width()];

        self.genres.encode_into(genres, &mut out[layout.genre]);
        self.text.encode_into(overview, &mut out[layout.text]);
        out[layout.year] = self.year.scale(year);
        out
    }

    /// Encode one catalog record
    pub fn transform(&self, record: &MovieRecord) -> Vec<f32> {
        self.encode(&record.genre, &record.overview, record.year)
    }

    /// Encode many records in parallel, keeping their order
    pub fn transform_batch(&self, records: &[MovieRecord]) -> Vec<Vec<f32>> {
        debug!("Encoding {} records", records.len());
        records.par_iter().map(|r| self.transform(r)).collect()
    }

    /// Check a deserialized encoder before it is used for serving
    pub fn validate(&self) -> Result<()> {
        if !self.genres.is_well_formed() {
            return Err(FeatureError::CorruptState(
                "genre classes are not sorted and unique".to_string(),
            ));
        }
        if !self.text.is_well_formed() {
            return Err(FeatureError::CorruptState(
                "text vocabulary and idf weights do not line up".to_string(),
            ));
        }
        if self.year.min > self.year.max {
            return Err(FeatureError::CorruptState(format!(
                "year range {}..={} is inverted",
                self.year.min, self.year.max
            )));
        }
        Ok(())
    }
}
