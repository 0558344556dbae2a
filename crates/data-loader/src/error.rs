//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while reading or writing movie tables.
///
/// Missing *values* are never an error here: they are kept as `None` on the
/// [`Record`](crate::Record) and resolved later by the feature encoder.
/// Only structural problems with the file itself end up in this enum.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file {path}: {source}")]
    FileNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error occurred while reading or writing a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV layer rejected a row (bad quoting, invalid UTF-8, ragged row)
    #[error("CSV error in {file} at line {line}: {reason}")]
    ParseError {
        file: String,
        line: u64,
        reason: String,
    },

    /// A column the caller depends on is absent from the header row
    #[error("Missing required column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// Extra column values do not line up with the table rows
    #[error("Expected {expected} values for column '{column}' but got {found}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

impl From<csv::Error> for DataLoadError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        DataLoadError::ParseError {
            file: "<csv>".to_string(),
            line,
            reason: err.to_string(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
