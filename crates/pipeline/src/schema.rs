//! One-hot column layout for the categorical fields.
//!
//! The schema is learned once from training data: for each of `Language`,
//! `Country` and `Content_Rating` (in that order) the observed values are
//! sorted, the first one is optionally dropped as the reference category,
//! and every remaining value becomes one 0/1 column named `<Field>_<value>`.
//!
//! At inference time a value maps to its column if it has one. The dropped
//! reference value and values never seen in training both map to nothing,
//! leaving every column of that field at 0.

use crate::error::FitError;
use data_loader::{CategoricalField, Record};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A single `(field, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub field: CategoricalField,
    pub value: String,
}

impl SchemaColumn {
    pub fn new(field: CategoricalField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Display name, e.g. `Language_English`
    pub fn name(&self) -> String {
        format!("{}_{}", self.field.column_name(), self.value)
    }
}

/// Ordered one-hot columns, immutable after [`CategoricalSchema::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSchema {
    /// Columns sorted by field order, then by value
    columns: Vec<SchemaColumn>,
    /// The reference value omitted for each field (empty when nothing was dropped)
    dropped: Vec<SchemaColumn>,
}

impl CategoricalSchema {
    /// Learn the column set from training records.
    ///
    /// Missing or blank values count as `Unknown`.
    pub fn fit(records: &[Record], drop_first_category: bool) -> Result<Self, FitError> {
        if records.is_empty() {
            return Err(FitError::EmptyCorpus);
        }

        // BTreeMap/BTreeSet give the field order and sorted values for free
        let mut observed: BTreeMap<CategoricalField, BTreeSet<&str>> = BTreeMap::new();
        for record in records {
            for field in CategoricalField::ALL {
                observed
                    .entry(field)
                    .or_default()
                    .insert(record.categorical_or_unknown(field));
            }
        }

        let mut columns = Vec::new();
        let mut dropped = Vec::new();
        for (field, values) in observed {
            let mut values = values.into_iter();
            if drop_first_category {
                if let Some(reference) = values.next() {
                    dropped.push(SchemaColumn::new(field, reference));
                }
            }
            columns.extend(values.map(|value| SchemaColumn::new(field, value)));
        }

        debug!(
            "Fitted categorical schema: {} columns, {} reference values dropped",
            columns.len(),
            dropped.len()
        );
        Ok(Self { columns, dropped })
    }

    /// Number of one-hot columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    /// Reference values that were dropped, one per field
    pub fn dropped(&self) -> &[SchemaColumn] {
        &self.dropped
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(SchemaColumn::name).collect()
    }

    /// Column index for a `(field, value)` pair
    pub fn index_of(&self, field: CategoricalField, value: &str) -> Option<usize> {
        self.columns
            .binary_search_by(|col| {
                col.field
                    .cmp(&field)
                    .then_with(|| col.value.as_str().cmp(value))
            })
            .ok()
    }

    /// Write the one-hot flags for `record` into `out`.
    ///
    /// `out` must be exactly `self.len()` long and is overwritten.
    pub fn encode_into(&self, record: &Record, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.len());
        out.fill(0.0);
        for field in CategoricalField::ALL {
            if let Some(idx) = self.index_of(field, record.categorical_or_unknown(field)) {
                out[idx] = 1.0;
            }
        }
    }
}
