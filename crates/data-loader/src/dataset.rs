//! Labelled training data.
//!
//! A [`Dataset`] is the cleaned list of records a training run works on:
//! rows without a description or a genre are dropped on load, everything
//! else is kept with its holes intact.

use crate::error::Result;
use crate::parser;
use crate::types::Record;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Labelled records ready for fitting.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Load a training CSV and drop rows missing `Description` or `Genre`
    ///
    /// Steps:
    /// 1. Read the table (fails on unreadable file or missing `Description`/`Genre` header)
    /// 2. Build typed records
    /// 3. Drop untrainable rows
    pub fn load_training(path: &Path) -> Result<Self> {
        info!("Loading training data from {}", path.display());

        let table = parser::read_table(path)?;
        let records = parser::records_from_table(&table, true)?;
        let total = records.len();

        let dataset = Self::from_records(records);
        info!(
            "Loaded {} rows, kept {} (dropped {} without description or genre)",
            total,
            dataset.len(),
            total - dataset.len()
        );
        Ok(dataset)
    }

    /// Build a dataset from in-memory records, dropping untrainable rows
    pub fn from_records(records: Vec<Record>) -> Self {
        let records = records.into_iter().filter(Record::is_trainable).collect();
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Genre labels in row order
    pub fn genres(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(|r| r.genre.as_deref())
            .collect()
    }

    /// Number of rows per genre, sorted by genre name
    pub fn genre_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for genre in self.genres() {
            *counts.entry(genre).or_insert(0) += 1;
        }
        counts
    }
}
