//! Min-max scaling of the release year.

use serde::{Deserialize, Serialize};

/// Fitted year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearScaler {
    pub min: i32,
    pub max: i32,
}

impl YearScaler {
    /// Returns `None` for an empty iterator
    pub fn fit(years: impl IntoIterator<Item = i32>) -> Option<Self> {
        years.into_iter().fold(None, |acc, year| match acc {
            None => Some(Self { min: year, max: year }),
            Some(s) => Some(Self {
                min: s.min.min(year),
                max: s.max.max(year),
            }),
        })
    }

    /// Scale `year` into the fitted range.
    ///
    /// Years outside the range extrapolate linearly. A degenerate range
    /// (`min == max`) is treated as a range of 1.
    pub fn scale(&self, year: i32) -> f32 {
        let range = match self.max - self.min {
            0 => 1.0,
            r => r as f64,
        };
        ((f64::from(year) - f64::from(self.min)) / range) as f32
    }
}
