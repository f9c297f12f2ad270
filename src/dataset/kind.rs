//! Column kind inference and numeric summaries.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::table::TabularDataset;

/// Inferred kind of a column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
    Temporal,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::Temporal => "temporal",
        };
        f.write_str(s)
    }
}

/// Date formats accepted when probing for temporal columns.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

fn parses_as_date(value: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
}

/// Infer the kind of a column from its non-missing values.
///
/// A column where every non-missing value parses as a number is numeric;
/// one where every non-missing value parses as a date is temporal;
/// everything else (including a column with no non-missing values at
/// all) is reported as text.
pub fn infer_kind<'a>(values: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut saw_value = false;
    let mut all_numeric = true;
    let mut all_temporal = true;

    for value in values {
        if TabularDataset::is_missing(value) {
            continue;
        }
        saw_value = true;
        let trimmed = value.trim();
        if trimmed.parse::<f64>().is_err() {
            all_numeric = false;
        }
        if !parses_as_date(trimmed) {
            all_temporal = false;
        }
        if !all_numeric && !all_temporal {
            return ColumnKind::Text;
        }
    }

    if !saw_value {
        ColumnKind::Text
    } else if all_numeric {
        ColumnKind::Numeric
    } else if all_temporal {
        ColumnKind::Temporal
    } else {
        ColumnKind::Text
    }
}

/// Summary statistics over the non-missing numeric values of a column.
#[derive(Debug, Clone, Default)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population skewness (third standardized moment). Zero when the
    /// column is constant or has fewer than two values.
    pub skewness: f64,
}

impl NumericSummary {
    /// Compute a summary from raw values.
    pub fn from_values(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self::default();
        }

        let mean = values.iter().sum::<f64>() / n as f64;

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        let skewness = if n < 2 || m2 == 0.0 {
            0.0
        } else {
            let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n as f64;
            m3 / m2.powf(1.5)
        };

        Self {
            count: n,
            mean,
            median,
            skewness,
        }
    }

    /// Collect the non-missing numeric values of a column and summarize
    /// them. Non-numeric stragglers in a mixed column are skipped.
    pub fn for_column(table: &TabularDataset, col: usize) -> Self {
        let values: Vec<f64> = table
            .column_values(col)
            .filter(|v| !TabularDataset::is_missing(v))
            .filter_map(|v| v.trim().parse::<f64>().ok())
            .collect();
        Self::from_values(&values)
    }
}
