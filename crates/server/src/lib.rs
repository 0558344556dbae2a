//! Server crate for the movie genre classifier.
//!
//! This crate contains:
//! - [`ModelBundle`]: versioned persistence of the trained artifacts
//! - [`TrainingOrchestrator`]: load → fit → evaluate → persist
//! - [`InferenceService`]: shared, read-only predictions over a bundle
//! - [`web`]: the axum form and health endpoint

pub mod bundle;
pub mod config;
pub mod error;
pub mod inference;
pub mod training;
pub mod web;

pub use bundle::{Manifest, ModelBundle};
pub use config::{ServeConfig, TrainingConfig};
pub use error::{ArtifactLoadError, PredictError};
pub use inference::{EMPTY_DESCRIPTION_MESSAGE, InferenceService, PredictionRequest};
pub use training::{TrainingOrchestrator, TrainingOutcome};
pub use web::{make_app, run_server};
