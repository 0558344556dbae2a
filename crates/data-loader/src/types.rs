//! Core domain types for movie genre records.
//!
//! A [`Record`] mirrors one row of the movie table. Every attribute is
//! optional because real-world exports are full of holes; deciding what a
//! hole *means* (empty text, `Unknown` category, `0.0`) is the job of the
//! feature encoder, not of the loader.
//!
//! Numeric attributes are kept as the raw cell text. Parsing is deferred so
//! that a malformed number is reported against the record that carries it
//! instead of aborting the whole file load.

use serde::{Deserialize, Serialize};

// =============================================================================
// Column names
// =============================================================================

/// Header of the free-text description column
pub const DESCRIPTION_COLUMN: &str = "Description";

/// Header of the label column (training files only)
pub const GENRE_COLUMN: &str = "Genre";

/// Header appended by batch prediction
pub const PREDICTED_GENRE_COLUMN: &str = "Predicted_Genre";

/// Literal substituted for a missing categorical value
pub const UNKNOWN_CATEGORY: &str = "Unknown";

// =============================================================================
// Field enums
// =============================================================================

/// The categorical attributes of a record, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoricalField {
    Language,
    Country,
    ContentRating,
}

impl CategoricalField {
    /// All categorical fields in the order their one-hot blocks are laid out
    pub const ALL: [CategoricalField; 3] = [
        CategoricalField::Language,
        CategoricalField::Country,
        CategoricalField::ContentRating,
    ];

    /// Column header used in CSV files and one-hot column names
    pub fn column_name(self) -> &'static str {
        match self {
            CategoricalField::Language => "Language",
            CategoricalField::Country => "Country",
            CategoricalField::ContentRating => "Content_Rating",
        }
    }
}

/// The numeric attributes of a record, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NumericField {
    Rating,
    Votes,
    BudgetUsd,
    Duration,
}

impl NumericField {
    /// All numeric fields in the order they trail the feature vector
    pub const ALL: [NumericField; 4] = [
        NumericField::Rating,
        NumericField::Votes,
        NumericField::BudgetUsd,
        NumericField::Duration,
    ];

    /// Column header used in CSV files
    pub fn column_name(self) -> &'static str {
        match self {
            NumericField::Rating => "Rating",
            NumericField::Votes => "Votes",
            NumericField::BudgetUsd => "Budget_USD",
            NumericField::Duration => "Duration",
        }
    }
}

// =============================================================================
// Record
// =============================================================================

/// One movie.
///
/// `genre` is only populated for training data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub description: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub content_rating: Option<String>,
    /// Raw cell text for `Rating`
    pub rating: Option<String>,
    /// Raw cell text for `Votes`
    pub votes: Option<String>,
    /// Raw cell text for `Budget_USD`
    pub budget_usd: Option<String>,
    /// Raw cell text for `Duration`
    pub duration: Option<String>,
    pub genre: Option<String>,
}

impl Record {
    /// Create a record with only a description set
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Set a categorical attribute (builder style)
    pub fn with_categorical(mut self, field: CategoricalField, value: impl Into<String>) -> Self {
        *self.categorical_slot(field) = Some(value.into());
        self
    }

    /// Set a numeric attribute from anything printable (builder style)
    ///
    /// The value is stored as text, exactly as if it had been read from a file.
    pub fn with_numeric(mut self, field: NumericField, value: impl ToString) -> Self {
        *self.numeric_slot(field) = Some(value.to_string());
        self
    }

    /// Set the training label (builder style)
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Description text, with a missing description read as empty
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Raw value of a categorical attribute
    pub fn categorical(&self, field: CategoricalField) -> Option<&str> {
        match field {
            CategoricalField::Language => self.language.as_deref(),
            CategoricalField::Country => self.country.as_deref(),
            CategoricalField::ContentRating => self.content_rating.as_deref(),
        }
    }

    /// Categorical value with missing or blank values replaced by `Unknown`
    pub fn categorical_or_unknown(&self, field: CategoricalField) -> &str {
        match self.categorical(field) {
            Some(value) if !value.trim().is_empty() => value,
            _ => UNKNOWN_CATEGORY,
        }
    }

    /// Raw text of a numeric attribute
    pub fn numeric(&self, field: NumericField) -> Option<&str> {
        match field {
            NumericField::Rating => self.rating.as_deref(),
            NumericField::Votes => self.votes.as_deref(),
            NumericField::BudgetUsd => self.budget_usd.as_deref(),
            NumericField::Duration => self.duration.as_deref(),
        }
    }

    /// True when the row can be used for training (has text and a label)
    pub fn is_trainable(&self) -> bool {
        self.description.is_some() && self.genre.is_some()
    }

    fn categorical_slot(&mut self, field: CategoricalField) -> &mut Option<String> {
        match field {
            CategoricalField::Language => &mut self.language,
            CategoricalField::Country => &mut self.country,
            CategoricalField::ContentRating => &mut self.content_rating,
        }
    }

    fn numeric_slot(&mut self, field: NumericField) -> &mut Option<String> {
        match field {
            NumericField::Rating => &mut self.rating,
            NumericField::Votes => &mut self.votes,
            NumericField::BudgetUsd => &mut self.budget_usd,
            NumericField::Duration => &mut self.duration,
        }
    }
}
