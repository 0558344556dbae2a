//! # Data Loader Crate
//!
//! This crate handles loading movie tables for genre classification.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Record, CategoricalField, NumericField)
//! - **parser**: Read CSV files into tables and records, write tables back out
//! - **dataset**: Cleaned, labelled training data
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Dataset;
//! use std::path::Path;
//!
//! // Load labelled data, dropping rows without description or genre
//! let dataset = Dataset::load_training(Path::new("data/movies.csv"))?;
//!
//! for (genre, count) in dataset.genre_counts() {
//!     println!("{genre}: {count}");
//! }
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod dataset;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Column names
    DESCRIPTION_COLUMN,
    GENRE_COLUMN,
    PREDICTED_GENRE_COLUMN,
    UNKNOWN_CATEGORY,
    // Core types
    Record,
    // Enums
    CategoricalField,
    NumericField,
};
pub use parser::{
    Table, is_missing, read_table, read_table_from_reader, records_from_table,
    write_table_with_column, write_table_with_column_to_path,
};
pub use dataset::Dataset;
