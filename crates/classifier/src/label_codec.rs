//! Bidirectional mapping between genre names and class ids.
//!
//! Classes are sorted by code point, so the same set of labels always
//! produces the same ids regardless of row order.

use crate::error::LabelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Genre name <-> contiguous id `0..len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCodec {
    classes: Vec<String>,
}

impl LabelCodec {
    /// Build a codec from every training label (duplicates allowed).
    pub fn fit<I, S>(labels: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        if classes.is_empty() {
            return Err(LabelError::NoLabels);
        }
        Ok(Self {
            classes: classes.into_iter().collect(),
        })
    }

    pub fn encode(&self, label: &str) -> Result<usize, LabelError> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| LabelError::UnknownLabel(label.to_string()))
    }

    /// Encode many labels, failing on the first unknown one
    pub fn encode_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>, LabelError> {
        labels.iter().map(|l| self.encode(l.as_ref())).collect()
    }

    pub fn decode(&self, id: usize) -> Result<&str, LabelError> {
        self.classes
            .get(id)
            .map(String::as_str)
            .ok_or(LabelError::InvalidClass {
                id,
                n_classes: self.classes.len(),
            })
    }

    /// Class names in id order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_sorts_and_dedups() {
        let codec = LabelCodec::fit(["Drama", "Action", "Drama", "Comedy"]).unwrap();
        assert_eq!(codec.classes(), &["Action", "Comedy", "Drama"]);
        assert_eq!(codec.encode("Drama"), Ok(2));
    }

    #[test]
    fn test_round_trip() {
        let codec = LabelCodec::fit(["Horror", "Action", "Sci-Fi"]).unwrap();
        for label in ["Horror", "Action", "Sci-Fi"] {
            let id = codec.encode(label).unwrap();
            assert_eq!(codec.decode(id).unwrap(), label);
        }
    }

    #[test]
    fn test_unknown_label() {
        let codec = LabelCodec::fit(["Action"]).unwrap();
        assert_eq!(
            codec.encode("Western"),
            Err(LabelError::UnknownLabel("Western".to_string()))
        );
    }

    #[test]
    fn test_invalid_class() {
        let codec = LabelCodec::fit(["Action", "Drama"]).unwrap();
        assert_eq!(
            codec.decode(2),
            Err(LabelError::InvalidClass { id: 2, n_classes: 2 })
        );
    }

    #[test]
    fn test_fit_empty() {
        let empty: Vec<&str> = Vec::new();
        assert_eq!(LabelCodec::fit(empty), Err(LabelError::NoLabels));
    }

    #[test]
    fn test_encode_all_stops_at_unknown() {
        let codec = LabelCodec::fit(["Action", "Drama"]).unwrap();
        assert_eq!(codec.encode_all(&["Drama", "Action"]), Ok(vec![1, 0]));
        assert!(codec.encode_all(&["Drama", "Noir"]).is_err());
    }
}
