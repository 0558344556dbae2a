//! Genre classification model.
//!
//! This crate provides:
//! - [`LabelCodec`]: genre name <-> class id
//! - [`RandomForestClassifier`]: bagged CART trees with Gini splits
//! - [`train_test_split`]: seeded hold-out split
//! - [`ClassificationReport`]: per-class precision/recall/F1
//!
//! ## Example Usage
//! ```ignore
//! use classifier::{ClassificationReport, ForestConfig, LabelCodec, RandomForestClassifier};
//!
//! let codec = LabelCodec::fit(&genres)?;
//! let y = codec.encode_all(&genres)?;
//! let split = classifier::train_test_split(x.n_rows(), 0.2, 42)?;
//!
//! let forest = RandomForestClassifier::fit(
//!     &x.select_rows(&split.train),
//!     &pick(&y, &split.train),
//!     codec.len(),
//!     &ForestConfig::default(),
//! )?;
//! ```

pub mod config;
pub mod error;
pub mod forest;
pub mod label_codec;
pub mod metrics;
pub mod split;
pub mod tree;

// Re-export main types
pub use config::{ForestConfig, MaxFeatures};
pub use error::{LabelError, ModelError};
pub use forest::RandomForestClassifier;
pub use label_codec::LabelCodec;
pub use metrics::{ClassMetrics, ClassificationReport};
pub use split::{TrainTestSplit, train_test_split};
pub use tree::DecisionTree;
