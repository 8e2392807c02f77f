//! TF-IDF weighting of overview text.
//!
//! ## Algorithm
//! Fit:
//! 1. Tokenize every document (see [`crate::text`])
//! 2. Rank terms by total count across the corpus, descending, ties by term
//! 3. Keep the top `max_features` terms, then order them lexicographically;
//!    that order defines the columns
//! 4. `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
//!
//! Transform: raw term count × idf, then L2-normalize the row.

use crate::text::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Fitted text vocabulary with one idf weight per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: Vec<String>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    pub fn fit<'a, I>(documents: I, max_features: usize) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut n_docs = 0usize;

        for doc in documents {
            n_docs += 1;
            let tokens = tokenize(doc);
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term.to_string()).or_insert(0) += 1;
            }
            for term in tokens {
                *term_counts.entry(term).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        vocabulary.sort();

        let n = n_docs as f64;
        let idf = vocabulary
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                (((1.0 + n) / (1.0 + df)).ln() + 1.0) as f32
            })
            .collect();

        Self { vocabulary, idf }
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f32] {
        &self.idf
    }

    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    /// Write the normalized TF-IDF row for `text` into `out`.
    ///
    /// Terms outside the vocabulary are ignored; a text with no known term
    /// leaves `out` all zero.
    pub fn encode_into(&self, text: &str, out: &mut [f32]) {
        for term in tokenize(text) {
            if let Ok(col) = self.vocabulary.binary_search(&term) {
                out[col] += 1.0;
            }
        }

        for (value, idf) in out.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = out.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            out.iter_mut().for_each(|v| *v /= norm);
        }
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.vocabulary.len() == self.idf.len()
            && self.vocabulary.windows(2).all(|w| w[0] < w[1])
            && self.idf.iter().all(|w| w.is_finite())
    }
}
