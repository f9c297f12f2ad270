//! In-memory tabular dataset.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RefineryError, Result};

/// An in-memory table of named columns with uniform-length rows.
///
/// Cells are held as strings; column kind (numeric, text, temporal) is
/// inferred on demand rather than stored. Cleaning passes may rewrite
/// cell values and remove exact-duplicate rows, but the column set and
/// order are fixed for the lifetime of the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabularDataset {
    /// Column headers, in order.
    columns: Vec<String>,
    /// Row data (row-major order).
    rows: Vec<Vec<String>>,
}

impl TabularDataset {
    /// Create a new dataset, validating that every row has exactly one
    /// cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let width = columns.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(RefineryError::InvalidDataset(format!(
                    "row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Parse a dataset from CSV text (first record is the header).
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Self::new(columns, rows)
    }

    /// Serialize the full dataset (header + all rows) to CSV text.
    pub fn to_csv_string(&self) -> Result<String> {
        self.write_csv(self.rows.len())
    }

    /// Serialize the header and the first `limit` rows to CSV text.
    pub fn head_csv(&self, limit: usize) -> Result<String> {
        self.write_csv(limit.min(self.rows.len()))
    }

    fn write_csv(&self, row_limit: usize) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in self.rows.iter().take(row_limit) {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| RefineryError::Config(format!("CSV buffer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| RefineryError::Config(format!("CSV output was not UTF-8: {}", e)))
    }

    /// Get the column names, in order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find the index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Set a specific cell value. Out-of-range indices are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: String) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    /// Remove exact-duplicate rows (all cells equal), keeping the first
    /// occurrence. Returns the number of rows removed.
    pub fn dedup_rows(&mut self) -> usize {
        let mut seen = std::collections::HashSet::new();
        let before = self.rows.len();
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }

    /// Check whether another dataset has the same column names in the
    /// same order.
    pub fn same_columns(&self, other: &TabularDataset) -> bool {
        self.columns == other.columns
    }

    /// Check if a cell value represents a missing value. Covers empty
    /// strings and the common missing sentinels, including pandas-style
    /// `NaN`/`NaT` spellings.
    pub fn is_missing(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nat")
    }
}

// Deserialization routes through `new` so a ragged payload cannot
// construct a table that skips row-width validation.
impl<'de> Deserialize<'de> for TabularDataset {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            columns: Vec<String>,
            rows: Vec<Vec<String>>,
        }

        let raw = Raw::deserialize(deserializer)?;
        TabularDataset::new(raw.columns, raw.rows).map_err(serde::de::Error::custom)
    }
}
