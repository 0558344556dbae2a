//! Feature encoding for movie records.
//!
//! This crate provides:
//! - [`Vocabulary`]: TF-IDF term weights for descriptions
//! - [`CategoricalSchema`]: one-hot layout for `Language`, `Country`, `Content_Rating`
//! - [`FeatureBlock`] trait and the three blocks that implement it
//! - [`FeatureEncoder`] for composing blocks into fixed-width rows
//!
//! ## Architecture
//! Encoding happens in two stages:
//! 1. [`fit`] learns the vocabulary and schema from training records
//! 2. [`encode`] turns any records into a [`FeatureMatrix`] using them
//!
//! The fitted pieces are immutable and serializable, so the exact same
//! column layout is reused at inference time.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{EncoderConfig, FeatureEncoder};
//!
//! let (vocabulary, schema) = pipeline::fit(&records, &EncoderConfig::default())?;
//! let matrix = pipeline::encode(&records, &vocabulary, &schema)?;
//!
//! // Later, for a single form submission
//! let row = FeatureEncoder::new(&vocabulary, &schema).encode_one(&record)?;
//! ```

pub mod blocks;
pub mod config;
pub mod encoder;
pub mod error;
pub mod matrix;
pub mod schema;
pub mod traits;
pub mod vocabulary;

// Re-export main types
pub use config::{DEFAULT_VOCABULARY_SIZE, EncoderConfig};
pub use encoder::{FeatureEncoder, encode, fit};
pub use error::{EncodingError, FitError};
pub use matrix::FeatureMatrix;
pub use schema::{CategoricalSchema, SchemaColumn};
pub use traits::FeatureBlock;
pub use vocabulary::{Vocabulary, tokenize};
