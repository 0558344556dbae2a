//! Feature construction settings.

use serde::{Deserialize, Serialize};

/// Default cap on the number of text-term columns
pub const DEFAULT_VOCABULARY_SIZE: usize = 500;

/// Knobs that shape the feature layout.
///
/// Both are fixed at training time and travel with the bundle: changing
/// them after the fact would change the column layout the model expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Maximum number of text-term columns (highest document frequency wins)
    pub vocabulary_size: usize,
    /// Omit the alphabetically first value of each categorical field
    pub drop_first_category: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            vocabulary_size: DEFAULT_VOCABULARY_SIZE,
            drop_first_category: true,
        }
    }
}

impl EncoderConfig {
    pub fn with_vocabulary_size(mut self, vocabulary_size: usize) -> Self {
        self.vocabulary_size = vocabulary_size;
        self
    }

    pub fn with_drop_first_category(mut self, drop_first_category: bool) -> Self {
        self.drop_first_category = drop_first_category;
        self
    }
}
