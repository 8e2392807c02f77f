//! Multi-hot encoding of genre labels.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fitted genre vocabulary.
///
/// Column `j` of the multi-hot block is `classes[j]`; classes are the
/// distinct labels seen during fit, sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreBinarizer {
    classes: Vec<String>,
}

impl GenreBinarizer {
    pub fn fit<'a, I>(genre_lists: I) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let classes: BTreeSet<&str> = genre_lists
            .into_iter()
            .flat_map(|labels| labels.iter().map(String::as_str))
            .collect();

        Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn width(&self) -> usize {
        self.classes.len()
    }

    /// Write the multi-hot vector for `labels` into `out`.
    ///
    /// Labels not seen during fit are ignored.
    pub fn encode_into(&self, labels: &[String], out: &mut [f32]) {
        for label in labels {
            if let Ok(col) = self.classes.binary_search_by(|c| c.as_str().cmp(label.trim())) {
                out[col] = 1.0;
            }
        }
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.classes.windows(2).all(|w| w[0] < w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fit_sorts_and_dedups() {
        let a = labels(&["Drama", "Action"]);
        let b = labels(&["Action", "Sci-Fi"]);
        let binarizer = GenreBinarizer::fit([a.as_slice(), b.as_slice()]);

        assert_eq!(binarizer.classes(), &["Action", "Drama", "Sci-Fi"]);
    }

    #[test]
    fn test_unseen_labels_contribute_nothing() {
        let a = labels(&["Action", "Drama"]);
        let binarizer = GenreBinarizer::fit([a.as_slice()]);

        let mut out = vec![0.0; binarizer.width()];
        binarizer.encode_into(&labels(&["Drama", "Western"]), &mut out);
        assert_eq!(out, vec![0.0, 1.0]);
    }
}
