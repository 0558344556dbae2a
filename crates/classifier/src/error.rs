//! Error types for the classifier crate.

use thiserror::Error;

/// Mapping between genre names and class ids failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("label '{0}' was not seen during training")]
    UnknownLabel(String),

    #[error("class id {id} is out of range ({n_classes} classes)")]
    InvalidClass { id: usize, n_classes: usize },

    #[error("cannot build a label codec from zero labels")]
    NoLabels,
}

/// Training or prediction with the forest failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("cannot train on an empty feature matrix")]
    EmptyTrainingSet,

    #[error("feature matrix has {rows} rows but {labels} labels were given")]
    LabelCountMismatch { rows: usize, labels: usize },

    #[error("label {label} is out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },

    #[error("expected {expected} features, got {found}")]
    FeatureMismatch { expected: usize, found: usize },

    #[error("invalid forest configuration: {0}")]
    InvalidConfig(String),

    #[error("test_fraction {test_fraction} leaves an empty train or test set for {n_samples} rows")]
    InvalidSplit { n_samples: usize, test_fraction: f64 },
}
