//! The FeatureEncoder lays the feature blocks side by side.
//!
//! Column layout of every row:
//!
//! ```text
//! [ text terms (vocabulary order) | one-hot flags (schema order) | Rating Votes Budget_USD Duration ]
//! ```
//!
//! The layout depends only on the fitted [`Vocabulary`] and
//! [`CategoricalSchema`], never on the records being encoded, so a single
//! inference record produces a row of exactly the training width.

use crate::blocks::{CategoricalBlock, NumericBlock, TextBlock};
use crate::config::EncoderConfig;
use crate::error::{EncodingError, FitError};
use crate::matrix::FeatureMatrix;
use crate::schema::CategoricalSchema;
use crate::traits::FeatureBlock;
use crate::vocabulary::Vocabulary;
use data_loader::Record;
use rayon::prelude::*;
use tracing::{debug, info};

/// Chains feature blocks into one row encoder.
///
/// ## Usage
/// ```ignore
/// let (vocabulary, schema) = pipeline::fit(&records, &EncoderConfig::default())?;
/// let encoder = FeatureEncoder::new(&vocabulary, &schema);
/// let matrix = encoder.encode(&records)?;
/// ```
pub struct FeatureEncoder<'a> {
    blocks: Vec<Box<dyn FeatureBlock + 'a>>,
}

impl<'a> FeatureEncoder<'a> {
    /// Encoder with the standard text, categorical and numeric blocks.
    pub fn new(vocabulary: &'a Vocabulary, schema: &'a CategoricalSchema) -> Self {
        Self::empty()
            .add_block(TextBlock::new(vocabulary))
            .add_block(CategoricalBlock::new(schema))
            .add_block(NumericBlock)
    }

    /// Encoder with no blocks; rows have width 0.
    pub fn empty() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Append a block (builder pattern)
    pub fn add_block(mut self, block: impl FeatureBlock + 'a) -> Self {
        self.blocks.push(Box::new(block));
        self
    }

    /// Total number of columns
    pub fn width(&self) -> usize {
        self.blocks.iter().map(|b| b.width()).sum()
    }

    /// Block names and widths, in column order
    pub fn layout(&self) -> Vec<(&str, usize)> {
        self.blocks.iter().map(|b| (b.name(), b.width())).collect()
    }

    /// Names of all columns, in order
    pub fn column_names(&self) -> Vec<String> {
        self.blocks.iter().flat_map(|b| b.column_names()).collect()
    }

    /// Encode one record into `out`.
    ///
    /// `row` is only used to label errors.
    pub fn encode_row(
        &self,
        row: usize,
        record: &Record,
        out: &mut [f64],
    ) -> Result<(), EncodingError> {
        debug_assert_eq!(out.len(), self.width());
        let mut offset = 0;
        for block in &self.blocks {
            let width = block.width();
            block.encode_into(row, record, &mut out[offset..offset + width])?;
            offset += width;
        }
        Ok(())
    }

    /// Encode a single record as a 1-row matrix.
    pub fn encode_one(&self, record: &Record) -> Result<FeatureMatrix, EncodingError> {
        let mut matrix = FeatureMatrix::zeros(1, self.width());
        self.encode_row(0, record, matrix.row_mut(0))?;
        Ok(matrix)
    }

    /// Encode every record, one row per record, in input order.
    ///
    /// Rows are encoded in parallel. If several rows are invalid the
    /// error for the earliest one is returned.
    pub fn encode(&self, records: &[Record]) -> Result<FeatureMatrix, EncodingError> {
        let width = self.width();
        debug!(
            "Encoding {} records into {} columns ({} blocks)",
            records.len(),
            width,
            self.blocks.len()
        );
        for block in &self.blocks {
            debug!("Block {}: {} columns", block.name(), block.width());
        }

        let rows: Vec<Result<Vec<f64>, EncodingError>> = records
            .par_iter()
            .enumerate()
            .map(|(row, record)| {
                let mut out = vec![0.0; width];
                self.encode_row(row, record, &mut out)?;
                Ok(out)
            })
            .collect();

        let mut matrix = FeatureMatrix::zeros(records.len(), width);
        for (idx, row) in rows.into_iter().enumerate() {
            matrix.row_mut(idx).copy_from_slice(&row?);
        }
        Ok(matrix)
    }
}

/// Learn the vocabulary and categorical schema from training records.
///
/// Missing descriptions count as empty text.
pub fn fit(
    records: &[Record],
    config: &EncoderConfig,
) -> Result<(Vocabulary, CategoricalSchema), FitError> {
    let descriptions: Vec<&str> = records.iter().map(Record::description_or_empty).collect();
    let vocabulary = Vocabulary::fit(&descriptions, config.vocabulary_size)?;
    let schema = CategoricalSchema::fit(records, config.drop_first_category)?;

    info!(
        "Fitted encoder on {} records: {} terms, {} categorical columns",
        records.len(),
        vocabulary.len(),
        schema.len()
    );
    Ok((vocabulary, schema))
}

/// Encode records with an already fitted vocabulary and schema.
pub fn encode(
    records: &[Record],
    vocabulary: &Vocabulary,
    schema: &CategoricalSchema,
) -> Result<FeatureMatrix, EncodingError> {
    FeatureEncoder::new(vocabulary, schema).encode(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{CategoricalField, NumericField};

    fn training() -> Vec<Record> {
        vec![
            Record::new("A heist in the city")
                .with_categorical(CategoricalField::Language, "English")
                .with_numeric(NumericField::Rating, 7.0),
            Record::new("A quiet family drama")
                .with_categorical(CategoricalField::Language, "French")
                .with_numeric(NumericField::Rating, 8.0),
        ]
    }

    #[test]
    fn test_empty_encoder() {
        let encoder = FeatureEncoder::empty();
        assert_eq!(encoder.width(), 0);
        let matrix = encoder.encode(&training()).unwrap();
        assert_eq!(matrix.shape(), (2, 0));
    }

    #[test]
    fn test_width_is_sum_of_blocks() {
        let records = training();
        let (vocabulary, schema) = fit(&records, &EncoderConfig::default()).unwrap();
        let encoder = FeatureEncoder::new(&vocabulary, &schema);

        assert_eq!(encoder.width(), vocabulary.len() + schema.len() + 4);
        assert_eq!(encoder.column_names().len(), encoder.width());
        assert_eq!(
            &encoder.column_names()[encoder.width() - 4..],
            &["Rating", "Votes", "Budget_USD", "Duration"]
        );
    }

    #[test]
    fn test_layout_names_blocks_in_column_order() {
        let records = training();
        let (vocabulary, schema) = fit(&records, &EncoderConfig::default()).unwrap();
        let encoder = FeatureEncoder::new(&vocabulary, &schema);

        assert_eq!(
            encoder.layout(),
            vec![
                ("TextBlock", vocabulary.len()),
                ("CategoricalBlock", schema.len()),
                ("NumericBlock", 4),
            ]
        );
    }

    #[test]
    fn test_encode_one_matches_batch_row() {
        let records = training();
        let (vocabulary, schema) = fit(&records, &EncoderConfig::default()).unwrap();
        let encoder = FeatureEncoder::new(&vocabulary, &schema);

        let batch = encoder.encode(&records).unwrap();
        let single = encoder.encode_one(&records[1]).unwrap();
        assert_eq!(single.row(0), batch.row(1));
    }

    #[test]
    fn test_encode_reports_earliest_bad_row() {
        let records = training();
        let (vocabulary, schema) = fit(&records, &EncoderConfig::default()).unwrap();

        let mut bad = records.clone();
        bad.push(Record::new("x").with_numeric(NumericField::Votes, "many"));
        bad.push(Record::new("y").with_numeric(NumericField::Rating, "abc"));

        let err = encode(&bad, &vocabulary, &schema).unwrap_err();
        assert!(matches!(err, EncodingError::InvalidNumber { row: 2, field: "Votes", .. }));
    }

    #[test]
    fn test_fit_rejects_empty_input() {
        assert_eq!(
            fit(&[], &EncoderConfig::default()).unwrap_err(),
            FitError::EmptyCorpus
        );
    }
}
