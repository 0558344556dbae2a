//! Numeric block: `Rating`, `Votes`, `Budget_USD`, `Duration` as floats.

use crate::error::EncodingError;
use crate::traits::FeatureBlock;
use data_loader::{NumericField, Record};

/// Passes the four numeric fields through unchanged.
///
/// ## Rules
/// - missing value → `0.0`
/// - text that parses to a finite float → that float
/// - anything else (`"abc"`, `"inf"`) → [`EncodingError::InvalidNumber`]
pub struct NumericBlock;

impl NumericBlock {
    /// Parse one raw numeric cell
    pub fn parse(
        row: usize,
        field: NumericField,
        raw: Option<&str>,
    ) -> Result<f64, EncodingError> {
        let Some(raw) = raw else {
            return Ok(0.0);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(0.0);
        }

        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(EncodingError::InvalidNumber {
                row,
                field: field.column_name(),
                value: raw.to_string(),
            }),
        }
    }
}

impl FeatureBlock for NumericBlock {
    fn name(&self) -> &str {
        "NumericBlock"
    }

    fn width(&self) -> usize {
        NumericField::ALL.len()
    }

    fn column_names(&self) -> Vec<String> {
        NumericField::ALL
            .iter()
            .map(|f| f.column_name().to_string())
            .collect()
    }

    fn encode_into(
        &self,
        row: usize,
        record: &Record,
        out: &mut [f64],
    ) -> Result<(), EncodingError> {
        for (slot, field) in out.iter_mut().zip(NumericField::ALL) {
            *slot = Self::parse(row, field, record.numeric(field))?;
        }
        Ok(())
    }
}
