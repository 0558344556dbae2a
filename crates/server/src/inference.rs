//! # Inference Service
//!
//! Wraps a loaded [`ModelBundle`] and turns raw records or form
//! submissions into genre names. The bundle is loaded once and never
//! mutated, so one service can be shared by any number of concurrent
//! callers behind an `Arc`.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use tracing::{debug, warn};

use data_loader::{CategoricalField, NumericField, Record};

use crate::bundle::ModelBundle;
use crate::error::{ArtifactLoadError, PredictError};

/// Returned when a request has no description to classify
pub const EMPTY_DESCRIPTION_MESSAGE: &str = "Please enter a movie description.";

/// A single prediction request, as submitted by the web form.
///
/// Every field is free text; blank optional fields count as missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PredictionRequest {
    pub description: String,
    pub language: Option<String>,
    pub country: Option<String>,
    pub content_rating: Option<String>,
    pub rating: Option<String>,
    pub votes: Option<String>,
    pub budget: Option<String>,
    pub duration: Option<String>,
}

impl PredictionRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Convert to a [`Record`], dropping blank fields
    pub fn to_record(&self) -> Record {
        let mut record = Record::new(self.description.clone());

        let categorical = [
            (CategoricalField::Language, &self.language),
            (CategoricalField::Country, &self.country),
            (CategoricalField::ContentRating, &self.content_rating),
        ];
        for (field, value) in categorical {
            if let Some(value) = non_blank(value) {
                record = record.with_categorical(field, value);
            }
        }

        let numeric = [
            (NumericField::Rating, &self.rating),
            (NumericField::Votes, &self.votes),
            (NumericField::BudgetUsd, &self.budget),
            (NumericField::Duration, &self.duration),
        ];
        for (field, value) in numeric {
            if let Some(value) = non_blank(value) {
                record = record.with_numeric(field, value);
            }
        }

        record
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Read-only prediction service over one bundle.
#[derive(Debug)]
pub struct InferenceService {
    bundle: ModelBundle,
    /// Number of rows that reached the classifier
    classified: AtomicU64,
}

impl InferenceService {
    pub fn new(bundle: ModelBundle) -> Self {
        Self {
            bundle,
            classified: AtomicU64::new(0),
        }
    }

    /// Load the bundle from `dir`; any problem is fatal for the caller.
    pub fn load(dir: &Path) -> Result<Self, ArtifactLoadError> {
        Ok(Self::new(ModelBundle::load(dir)?))
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// How many rows have been run through the classifier so far
    pub fn classified_count(&self) -> u64 {
        self.classified.load(Ordering::Relaxed)
    }

    /// Predict the genre for a form submission.
    pub fn predict(&self, request: &PredictionRequest) -> Result<String, PredictError> {
        self.predict_record(&request.to_record())
    }

    /// Predict the genre for one record.
    ///
    /// A record whose description is missing or blank is rejected before
    /// the classifier runs.
    pub fn predict_record(&self, record: &Record) -> Result<String, PredictError> {
        self.predict_row(0, record)
    }

    /// One outcome per record, in order. A bad record only fails itself.
    pub fn predict_batch(&self, records: &[Record]) -> Vec<Result<String, PredictError>> {
        let outcomes: Vec<_> = records
            .iter()
            .enumerate()
            .map(|(row, record)| self.predict_row(row, record))
            .collect();

        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        if failed > 0 {
            warn!("{} of {} rows could not be classified", failed, records.len());
        }
        outcomes
    }

    fn predict_row(&self, row: usize, record: &Record) -> Result<String, PredictError> {
        if record.description_or_empty().trim().is_empty() {
            return Err(PredictError::Validation(EMPTY_DESCRIPTION_MESSAGE.to_string()));
        }

        let encoder = self.bundle.encoder();
        let mut features = vec![0.0; encoder.width()];
        encoder.encode_row(row, record, &mut features)?;

        self.classified.fetch_add(1, Ordering::Relaxed);
        let class = self.bundle.model().predict_row(&features)?;
        let genre = self.bundle.labels().decode(class)?.to_string();

        debug!("Row {} classified as {}", row, genre);
        Ok(genre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_blank_fields_are_missing() {
        let request = PredictionRequest {
            description: "A heist".to_string(),
            language: Some("  ".to_string()),
            country: Some("USA".to_string()),
            rating: Some("".to_string()),
            votes: Some(" 12 ".to_string()),
            ..PredictionRequest::default()
        };
        let record = request.to_record();

        assert_eq!(record.categorical(CategoricalField::Language), None);
        assert_eq!(record.categorical(CategoricalField::Country), Some("USA"));
        assert_eq!(record.numeric(NumericField::Rating), None);
        assert_eq!(record.numeric(NumericField::Votes), Some("12"));
        assert_eq!(record.description.as_deref(), Some("A heist"));
    }

    #[test]
    fn test_request_budget_maps_to_budget_usd() {
        let request = PredictionRequest {
            budget: Some("5000000".to_string()),
            ..PredictionRequest::new("x")
        };
        assert_eq!(
            request.to_record().numeric(NumericField::BudgetUsd),
            Some("5000000")
        );
    }
}
