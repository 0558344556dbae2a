//! Error types for fitting and encoding.

use thiserror::Error;

/// A record could not be turned into a feature row.
///
/// Only numeric fields can fail: missing values of every kind have a
/// defined encoding, but text that does not parse as a finite number is
/// surfaced to the caller instead of being silently zeroed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("could not convert {field} value '{value}' to a number (row {row})")]
    InvalidNumber {
        row: usize,
        field: &'static str,
        value: String,
    },
}

/// The training corpus cannot produce a usable vocabulary or schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("cannot fit on an empty set of records")]
    EmptyCorpus,

    #[error("vocabulary_size must be at least 1")]
    InvalidVocabularySize,

    #[error("no terms found in {documents} descriptions; every description is empty or has no word of two or more characters")]
    EmptyVocabulary { documents: usize },
}
