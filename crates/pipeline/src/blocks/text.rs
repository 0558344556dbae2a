//! Text block: TF-IDF weights of the description.

use crate::error::EncodingError;
use crate::traits::FeatureBlock;
use crate::vocabulary::Vocabulary;
use data_loader::Record;

/// Encodes the description against a fixed vocabulary.
///
/// A missing description is encoded as empty text (an all-zero block).
pub struct TextBlock<'a> {
    vocabulary: &'a Vocabulary,
}

impl<'a> TextBlock<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self { vocabulary }
    }
}

impl FeatureBlock for TextBlock<'_> {
    fn name(&self) -> &str {
        "TextBlock"
    }

    fn width(&self) -> usize {
        self.vocabulary.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.vocabulary.terms().to_vec()
    }

    fn encode_into(
        &self,
        _row: usize,
        record: &Record,
        out: &mut [f64],
    ) -> Result<(), EncodingError> {
        self.vocabulary.encode_into(record.description_or_empty(), out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_block_missing_description_is_zero() {
        let vocabulary = Vocabulary::fit(&["heist movie", "drama movie"], 10).unwrap();
        let block = TextBlock::new(&vocabulary);

        let mut out = vec![1.0; block.width()];
        block.encode_into(0, &Record::default(), &mut out).unwrap();
        assert!(out.iter().all(|&v| v == 0.0));

        block.encode_into(0, &Record::new("heist"), &mut out).unwrap();
        let heist = vocabulary.index_of("heist").unwrap();
        assert_eq!(out[heist], 1.0);
    }
}
