//! Categorical block: one-hot flags aligned to the training schema.

use crate::error::EncodingError;
use crate::schema::CategoricalSchema;
use crate::traits::FeatureBlock;
use data_loader::Record;

/// Encodes `Language`, `Country` and `Content_Rating` as 0/1 flags.
///
/// Unseen values and the dropped reference value leave their field's
/// columns at 0; this block never fails.
pub struct CategoricalBlock<'a> {
    schema: &'a CategoricalSchema,
}

impl<'a> CategoricalBlock<'a> {
    pub fn new(schema: &'a CategoricalSchema) -> Self {
        Self { schema }
    }
}

impl FeatureBlock for CategoricalBlock<'_> {
    fn name(&self) -> &str {
        "CategoricalBlock"
    }

    fn width(&self) -> usize {
        self.schema.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.schema.column_names()
    }

    fn encode_into(
        &self,
        _row: usize,
        record: &Record,
        out: &mut [f64],
    ) -> Result<(), EncodingError> {
        self.schema.encode_into(record, out);
        Ok(())
    }
}
