//! Resolving free-text titles to catalog rows.
//!
//! Resolution runs in two passes:
//! 1. Fuzzy: score every catalog title with a `TitleMatcher`; the best score
//!    wins if it reaches the threshold (ties go to the earlier row)
//! 2. Substring: otherwise the first title containing the query wins
//!
//! Both passes compare lowercased strings, so "leo" resolves to "LEO" ahead
//! of "Lea". Equal scores keep catalog order: "pushpa" against
//! `["Pushpa 1", "Pushpa 2"]` resolves to "Pushpa 1". A case-sensitive
//! closest-match that breaks ties on the greatest title would pick "Lea" and
//! "Pushpa 2" instead.
//!
//! The matcher is a strategy object so the scoring algorithm and threshold
//! can change without touching callers.

use crate::error::{Result, SimilarityError};
use data_loader::{Catalog, RowId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Default minimum score for a fuzzy match
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

/// A string similarity measure in `[0, 1]`
pub trait TitleMatcher: Send + Sync {
    fn name(&self) -> &str;

    /// Similarity of two already-lowercased strings
    fn score(&self, query: &str, candidate: &str) -> f64;
}

/// Ratcliff/Obershelp ratio: `2 * M / T` where `M` is the number of
/// characters in recursively found longest common blocks and `T` the total
/// length of both strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl TitleMatcher for SequenceRatio {
    fn name(&self) -> &str {
        "sequence-ratio"
    }

    fn score(&self, query: &str, candidate: &str) -> f64 {
        let a: Vec<char> = query.chars().collect();
        let b: Vec<char> = candidate.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * matching_chars(&a, &b) as f64 / total as f64
    }
}

/// Characters covered by the matching blocks of `a` and `b`
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_block(a, b, alo, ahi, blo, bhi);
        if size > 0 {
            matched += size;
            pending.push((alo, i, blo, j));
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`, earliest first
fn longest_block(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    // run[x] = length of the common run ending at b[blo + x - 1]
    let mut prev = vec![0usize; bhi - blo + 1];
    let mut cur = vec![0usize; bhi - blo + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let x = j - blo + 1;
            cur[x] = if a[i] == b[j] { prev[x - 1] + 1 } else { 0 };
            if cur[x] > best.2 {
                best = (i + 1 - cur[x], j + 1 - cur[x], cur[x]);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}

/// `1 - levenshtein(a, b) / max(len(a), len(b))`
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl TitleMatcher for NormalizedLevenshtein {
    fn name(&self) -> &str {
        "normalized-levenshtein"
    }

    fn score(&self, query: &str, candidate: &str) -> f64 {
        let a: Vec<char> = query.chars().collect();
        let b: Vec<char> = candidate.chars().collect();
        let longest = a.len().max(b.len());
        if longest == 0 {
            return 1.0;
        }
        1.0 - levenshtein(&a, &b) as f64 / longest as f64
    }
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            cur[j + 1] = substitution.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Which matching strategy to use, as named in configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatcherKind {
    #[default]
    SequenceRatio,
    NormalizedLevenshtein,
}

impl MatcherKind {
    pub fn build(self) -> Arc<dyn TitleMatcher> {
        match self {
            MatcherKind::SequenceRatio => Arc::new(SequenceRatio),
            MatcherKind::NormalizedLevenshtein => Arc::new(NormalizedLevenshtein),
        }
    }
}

impl FromStr for MatcherKind {
    type Err = SimilarityError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim() {
            "sequence-ratio" => Ok(MatcherKind::SequenceRatio),
            "normalized-levenshtein" => Ok(MatcherKind::NormalizedLevenshtein),
            other => Err(SimilarityError::UnknownMatcher(other.to_string())),
        }
    }
}

/// How a title was resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Fuzzy { score: f64 },
    Substring,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleMatch {
    pub id: RowId,
    pub kind: MatchKind,
}

/// Resolves free text to a catalog row.
#[derive(Clone)]
pub struct TitleResolver {
    matcher: Arc<dyn TitleMatcher>,
    threshold: f64,
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self::new(Arc::new(SequenceRatio), DEFAULT_MATCH_THRESHOLD)
    }
}

impl TitleResolver {
    pub fn new(matcher: Arc<dyn TitleMatcher>, threshold: f64) -> Self {
        Self { matcher, threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn matcher_name(&self) -> &str {
        self.matcher.name()
    }

    /// Resolve `query` against the catalog titles
    pub fn resolve_title(&self, catalog: &Catalog, query: &str) -> Result<TitleMatch> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(SimilarityError::TitleNotFound(query.to_string()));
        }

        let titles: Vec<(RowId, String)> = catalog
            .iter()
            .map(|(id, record)| (id, record.title.to_lowercase()))
            .collect();

        let mut best: Option<(RowId, f64)> = None;
        for (id, title) in &titles {
            let score = self.matcher.score(&needle, title);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((*id, score));
            }
        }

        if let Some((id, score)) = best.filter(|(_, s)| *s >= self.threshold) {
            debug!(
                "Resolved '{}' to row {} ({} score {:.3})",
                query,
                id,
                self.matcher.name(),
                score
            );
            return Ok(TitleMatch {
                id,
                kind: MatchKind::Fuzzy { score },
            });
        }

        titles
            .iter()
            .find(|(_, title)| title.contains(&needle))
            .map(|(id, _)| {
                debug!("Resolved '{}' to row {} by substring", query, id);
                TitleMatch {
                    id: *id,
                    kind: MatchKind::Substring,
                }
            })
            .ok_or_else(|| SimilarityError::TitleNotFound(query.to_string()))
    }
}
