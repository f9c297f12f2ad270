//! Bounded textual digests used to brief external collaborators.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::kind::{ColumnKind, infer_kind};
use super::table::TabularDataset;

/// A bounded digest of one dataset: schema, leading rows, and missing
/// counts. Small enough to embed in a prompt regardless of dataset size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleBrief {
    /// Column name and inferred kind, in column order.
    pub columns: Vec<(String, ColumnKind)>,
    /// Per-column count of missing values, in column order.
    pub missing: IndexMap<String, usize>,
    /// The first rows serialized as CSV text (header included).
    pub head: String,
    /// Total row count of the source dataset.
    pub row_count: usize,
}

impl SampleBrief {
    /// Render the brief as a prompt block.
    pub fn to_prompt_string(&self) -> String {
        let schema = self
            .columns
            .iter()
            .map(|(name, kind)| format!("{}({})", name, kind))
            .collect::<Vec<_>>()
            .join(", ");

        let missing = self
            .missing
            .iter()
            .map(|(name, count)| format!("{}={}", name, count))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Schema: {}\nRows: {}\nMissing values: {}\nSample:\n{}",
            schema, self.row_count, missing, self.head
        )
    }
}

/// Derives a [`SampleBrief`] from a dataset without mutating it.
#[derive(Debug, Clone)]
pub struct SchemaSampler {
    /// Number of leading rows included in the sample.
    sample_rows: usize,
}

impl SchemaSampler {
    pub fn new(sample_rows: usize) -> Self {
        Self { sample_rows }
    }

    /// Build a brief. Total over any valid dataset: a zero-row table
    /// yields a header-only sample, and a column whose kind cannot be
    /// inferred is reported as text.
    pub fn brief(&self, table: &TabularDataset) -> SampleBrief {
        let columns: Vec<(String, ColumnKind)> = table
            .column_names()
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), infer_kind(table.column_values(i))))
            .collect();

        let missing: IndexMap<String, usize> = table
            .column_names()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let count = table
                    .column_values(i)
                    .filter(|v| TabularDataset::is_missing(v))
                    .count();
                (name.clone(), count)
            })
            .collect();

        // Writing CSV into an in-memory buffer cannot fail for valid
        // UTF-8 cell data; degrade to an empty sample rather than error.
        let head = table.head_csv(self.sample_rows).unwrap_or_default();

        SampleBrief {
            columns,
            missing,
            head,
            row_count: table.row_count(),
        }
    }
}

impl Default for SchemaSampler {
    fn default() -> Self {
        Self::new(5)
    }
}
