//! Core trait for the encoding pipeline.
//!
//! A feature vector is the concatenation of independent blocks (text,
//! categorical, numeric). Each block knows its own width and how to fill
//! its slice of a row, so the encoder only has to lay them side by side.

use crate::error::EncodingError;
use data_loader::Record;

/// One contiguous group of columns in the feature vector.
///
/// ## Design Note
/// - `Send + Sync` lets the encoder fill rows in parallel
/// - `width` must be constant for the lifetime of the block; the encoder
///   relies on it to keep column positions stable between training and
///   inference
pub trait FeatureBlock: Send + Sync {
    /// Returns the name of this block (for logging/debugging)
    fn name(&self) -> &str;

    /// Number of columns this block contributes
    fn width(&self) -> usize;

    /// Column names in order, `width()` entries
    fn column_names(&self) -> Vec<String>;

    /// Fill `out` (exactly `width()` long) with this block's values for `record`.
    ///
    /// # Arguments
    /// * `row` - Position of the record in its batch (for error reporting)
    /// * `record` - The record to encode
    /// * `out` - Destination slice, overwritten
    fn encode_into(&self, row: usize, record: &Record, out: &mut [f64])
        -> Result<(), EncodingError>;
}
