//! CSV reading and writing for movie tables.
//!
//! Two layers:
//! - [`Table`]: the file as-is (header row plus string rows). Batch
//!   prediction needs this to echo the input back with one extra column.
//! - [`Record`]: the typed view the pipeline works with, built from a table
//!   by header name so column order in the file does not matter.
//!
//! A cell is "missing" when it is empty or one of the usual NA spellings
//! that spreadsheet and dataframe exports produce.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Cell values that are read as missing
const NA_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>",
    "#N/A", "#NA", "#N/A N/A", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

/// Returns true when a raw cell should be treated as a missing value
pub fn is_missing(cell: &str) -> bool {
    NA_MARKERS.contains(&cell)
}

/// A CSV file held in memory: header row plus data rows.
#[derive(Debug, Clone)]
pub struct Table {
    /// Human readable origin (file path or `<memory>`), used in errors
    pub source: String,
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl Table {
    /// Position of a column by header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| DataLoadError::MissingColumn {
                file: self.source.clone(),
                column: name.to_string(),
            })
    }
}

/// Read a CSV file with a header row
pub fn read_table(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|source| DataLoadError::FileNotFound {
        path: path.display().to_string(),
        source,
    })?;
    let mut table = read_table_from_reader(file)?;
    table.source = path.display().to_string();
    Ok(table)
}

/// Read CSV data with a header row from any reader
pub fn read_table_from_reader<R: Read>(reader: R) -> Result<Table> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for result in reader.records() {
        rows.push(result?);
    }

    debug!("Read {} rows with {} columns", rows.len(), headers.len());
    Ok(Table {
        source: "<memory>".to_string(),
        headers,
        rows,
    })
}

/// Build typed records from a table.
///
/// `Description` must be present in the header; with `require_genre` the
/// `Genre` column must be present too. Any other record column that is not
/// in the header reads as missing for every row.
pub fn records_from_table(table: &Table, require_genre: bool) -> Result<Vec<Record>> {
    let description_idx = table.require_column(DESCRIPTION_COLUMN)?;
    let genre_idx = if require_genre {
        Some(table.require_column(GENRE_COLUMN)?)
    } else {
        table.column_index(GENRE_COLUMN)
    };

    let categorical_idx: HashMap<CategoricalField, usize> = CategoricalField::ALL
        .iter()
        .filter_map(|&field| table.column_index(field.column_name()).map(|idx| (field, idx)))
        .collect();
    let numeric_idx: HashMap<NumericField, usize> = NumericField::ALL
        .iter()
        .filter_map(|&field| table.column_index(field.column_name()).map(|idx| (field, idx)))
        .collect();

    let records = table
        .rows
        .iter()
        .map(|row| {
            let cell = |idx: Option<usize>| -> Option<String> {
                idx.and_then(|i| row.get(i))
                    .filter(|value| !is_missing(value))
                    .map(|value| value.to_string())
            };

            let mut record = Record {
                description: cell(Some(description_idx)),
                genre: cell(genre_idx),
                ..Record::default()
            };
            for field in CategoricalField::ALL {
                if let Some(value) = cell(categorical_idx.get(&field).copied()) {
                    record = record.with_categorical(field, value);
                }
            }
            for field in NumericField::ALL {
                if let Some(value) = cell(numeric_idx.get(&field).copied()) {
                    record = record.with_numeric(field, value);
                }
            }
            record
        })
        .collect();

    Ok(records)
}

/// Write `table` followed by one extra column.
///
/// `values` must have exactly one entry per table row.
pub fn write_table_with_column<W: Write>(
    writer: W,
    table: &Table,
    column: &str,
    values: &[String],
) -> Result<()> {
    if values.len() != table.rows.len() {
        return Err(DataLoadError::ColumnLengthMismatch {
            column: column.to_string(),
            expected: table.rows.len(),
            found: values.len(),
        });
    }

    let mut writer = WriterBuilder::new().from_writer(writer);

    let mut headers = table.headers.clone();
    headers.push_field(column);
    writer.write_record(&headers)?;

    for (row, value) in table.rows.iter().zip(values) {
        let mut row = row.clone();
        row.push_field(value);
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write `table` plus one extra column to a file path
pub fn write_table_with_column_to_path(
    path: &Path,
    table: &Table,
    column: &str,
    values: &[String],
) -> Result<()> {
    let file = File::create(path)?;
    write_table_with_column(file, table, column, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Title,Description,Language,Country,Content_Rating,Rating,Votes,Budget_USD,Duration,Genre
Heat,A thrilling heist,English,USA,R,8.3,600000,60000000,170,Action
Nameless,,French,,NA,,12,,95,Drama
Quiet,Two people talk,N/A,France,PG,abc,1,2,3,
";

    fn sample_table() -> Table {
        read_table_from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(""));
        assert!(is_missing("NA"));
        assert!(is_missing("NaN"));
        assert!(!is_missing("0"));
        assert!(!is_missing("Unknown"));
    }

    #[test]
    fn test_read_table() {
        let table = sample_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column_index("Genre"), Some(9));
        assert_eq!(table.column_index("Nope"), None);
    }

    #[test]
    fn test_records_from_table_maps_columns_by_name() {
        let records = records_from_table(&sample_table(), true).unwrap();
        assert_eq!(records.len(), 3);

        let heat = &records[0];
        assert_eq!(heat.description.as_deref(), Some("A thrilling heist"));
        assert_eq!(heat.categorical(CategoricalField::ContentRating), Some("R"));
        assert_eq!(heat.numeric(NumericField::BudgetUsd), Some("60000000"));
        assert_eq!(heat.genre.as_deref(), Some("Action"));
    }

    #[test]
    fn test_missing_cells_become_none() {
        let records = records_from_table(&sample_table(), true).unwrap();

        let nameless = &records[1];
        assert_eq!(nameless.description, None);
        assert_eq!(nameless.country, None);
        assert_eq!(nameless.content_rating, None);
        assert_eq!(nameless.rating, None);

        let quiet = &records[2];
        assert_eq!(quiet.language, None);
        assert_eq!(quiet.genre, None);
        // malformed numbers are kept verbatim for the encoder to reject
        assert_eq!(quiet.rating.as_deref(), Some("abc"));
    }

    #[test]
    fn test_missing_required_column() {
        let table = read_table_from_reader("Description,Rating\nx,1\n".as_bytes()).unwrap();
        let err = records_from_table(&table, true).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { ref column, .. } if column == "Genre"));

        // Genre is optional for prediction input, other columns default to missing
        let records = records_from_table(&table, false).unwrap();
        assert_eq!(records[0].language, None);
        assert_eq!(records[0].rating.as_deref(), Some("1"));
    }

    #[test]
    fn test_write_table_with_column() {
        let table = read_table_from_reader("Description,Rating\na,1\nb,2\n".as_bytes()).unwrap();
        let mut out = Vec::new();
        write_table_with_column(
            &mut out,
            &table,
            PREDICTED_GENRE_COLUMN,
            &["Action".to_string(), String::new()],
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Description,Rating,Predicted_Genre\na,1,Action\nb,2,\n");
    }

    #[test]
    fn test_write_table_with_column_length_mismatch() {
        let table = read_table_from_reader("Description\na\nb\n".as_bytes()).unwrap();
        let err = write_table_with_column(Vec::new(), &table, "X", &["only one".to_string()])
            .unwrap_err();
        assert!(matches!(err, DataLoadError::ColumnLengthMismatch { expected: 2, found: 1, .. }));
    }
}
