//! Error types for bundle loading and per-request prediction.

use classifier::{LabelError, ModelError};
use pipeline::EncodingError;
use thiserror::Error;
use uuid::Uuid;

/// The bundle cannot be used; the process must not serve.
#[derive(Error, Debug)]
pub enum ArtifactLoadError {
    #[error("bundle file not found: {path}")]
    Missing { path: String },

    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid artifact")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("bundle format {found} is not supported (expected {supported})")]
    UnsupportedFormat { found: u32, supported: u32 },

    #[error("{artifact} belongs to bundle {found}, manifest says {expected}")]
    VersionMismatch {
        artifact: &'static str,
        expected: Uuid,
        found: Uuid,
    },

    #[error("inconsistent bundle: {0}")]
    Inconsistent(String),
}

/// One prediction failed; other requests are unaffected.
#[derive(Error, Debug)]
pub enum PredictError {
    /// User input is missing a required field
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Label(#[from] LabelError),
}
