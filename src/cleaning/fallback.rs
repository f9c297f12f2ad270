//! Deterministic rule-based cleaner.

use tracing::debug;

use crate::dataset::{ColumnKind, NumericSummary, TabularDataset, infer_kind};

use super::rules::{TextRole, format_number, normalize_phone, strip_noise, text_role};

/// Rule-based cleaner applied whenever procedure generation or execution
/// fails. This is the pipeline's correctness floor: it is total over any
/// valid dataset and relies on no external collaborator.
#[derive(Debug, Clone)]
pub struct FallbackCleaner {
    /// Skewness magnitude above which numeric imputation switches from
    /// mean to median.
    skew_threshold: f64,
}

impl FallbackCleaner {
    pub fn new(skew_threshold: f64) -> Self {
        Self { skew_threshold }
    }

    /// Clean a dataset. Never fails; the output has the same columns as
    /// the input and at most as many rows.
    pub fn clean(&self, table: &TabularDataset) -> TabularDataset {
        let mut out = table.clone();

        for col in 0..out.column_count() {
            let name = out.column_names()[col].clone();
            match text_role(&name) {
                TextRole::Phone => self.clean_phone_column(&mut out, col),
                TextRole::Email | TextRole::Identifier => self.clean_trim_column(&mut out, col),
                TextRole::Generic => {
                    let kind = infer_kind(out.column_values(col));
                    match kind {
                        ColumnKind::Numeric => self.impute_numeric_column(&mut out, col, &name),
                        // Date strings keep their separators; trim only.
                        ColumnKind::Temporal => self.clean_trim_column(&mut out, col),
                        ColumnKind::Text => self.clean_text_column(&mut out, col),
                    }
                }
            }
        }

        let removed = out.dedup_rows();
        if removed > 0 {
            debug!(removed, "fallback cleaner removed duplicate rows");
        }
        out
    }

    /// Fill missing numeric cells with the column mean, or the median
    /// when the distribution is detectably skewed.
    fn impute_numeric_column(&self, table: &mut TabularDataset, col: usize, name: &str) {
        let summary = NumericSummary::for_column(table, col);
        let fill = if summary.count == 0 {
            // No numeric evidence at all; fall through to the text rule.
            "unknown".to_string()
        } else if summary.skewness.abs() > self.skew_threshold {
            debug!(column = name, skewness = summary.skewness, "imputing by median");
            format_number(summary.median)
        } else {
            format_number(summary.mean)
        };

        for row in 0..table.row_count() {
            let value = table.get(row, col).unwrap_or_default();
            if TabularDataset::is_missing(value) {
                table.set(row, col, fill.clone());
            } else {
                let trimmed = value.trim().to_string();
                table.set(row, col, trimmed);
            }
        }
    }

    /// Trim whitespace, fill missing with "unknown" (email, identifier,
    /// and temporal columns).
    fn clean_trim_column(&self, table: &mut TabularDataset, col: usize) {
        for row in 0..table.row_count() {
            let value = table.get(row, col).unwrap_or_default();
            let cleaned = if TabularDataset::is_missing(value) {
                "unknown".to_string()
            } else {
                value.trim().to_string()
            };
            table.set(row, col, cleaned);
        }
    }

    /// Normalize phone cells; missing cells become "unknown" via the
    /// empty-digit rule.
    fn clean_phone_column(&self, table: &mut TabularDataset, col: usize) {
        for row in 0..table.row_count() {
            let value = table.get(row, col).unwrap_or_default();
            let cleaned = if TabularDataset::is_missing(value) {
                "unknown".to_string()
            } else {
                normalize_phone(value)
            };
            table.set(row, col, cleaned);
        }
    }

    /// Strip noise and trim generic text cells, fill missing with
    /// "unknown".
    fn clean_text_column(&self, table: &mut TabularDataset, col: usize) {
        for row in 0..table.row_count() {
            let value = table.get(row, col).unwrap_or_default();
            let stripped = if TabularDataset::is_missing(value) {
                String::new()
            } else {
                strip_noise(value)
            };
            // A cell of pure noise strips down to nothing; treat it like
            // a missing value.
            let cleaned = if stripped.is_empty() {
                "unknown".to_string()
            } else {
                stripped
            };
            table.set(row, col, cleaned);
        }
    }
}

impl Default for FallbackCleaner {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(cols: &[&str], rows: &[&[&str]]) -> TabularDataset {
        TabularDataset::new(
            cols.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_numeric_mean_imputation() {
        let t = table(&["age"], &[&["10"], &["20"], &[""]]);
        let cleaned = FallbackCleaner::default().clean(&t);
        assert_eq!(cleaned.get(2, 0), Some("15"));
    }

    #[test]
    fn test_numeric_median_on_skewed_column() {
        // Heavy right tail pushes skewness above the threshold.
        let t = table(
            &["income"],
            &[&["1"], &["1"], &["1"], &["2"], &["1000"], &["nan"]],
        );
        let cleaned = FallbackCleaner::default().clean(&t);
        assert_eq!(cleaned.get(5, 0), Some("1"));
    }

    #[test]
    fn test_text_fill_and_noise_strip() {
        let t = table(&["name"], &[&[" Al!ce "], &["null"]]);
        let cleaned = FallbackCleaner::default().clean(&t);
        assert_eq!(cleaned.get(0, 0), Some("Alce"));
        assert_eq!(cleaned.get(1, 0), Some("unknown"));
    }

    #[test]
    fn test_pure_noise_cell_becomes_unknown() {
        let t = table(&["name"], &[&["!#$%"], &["ok"]]);
        let cleaned = FallbackCleaner::default().clean(&t);
        assert_eq!(cleaned.get(0, 0), Some("unknown"));
    }

    #[test]
    fn test_email_column_only_trimmed() {
        let t = table(&["EMAIL"], &[&[" a+b@example.com "]]);
        let cleaned = FallbackCleaner::default().clean(&t);
        assert_eq!(cleaned.get(0, 0), Some("a+b@example.com"));
    }

    #[test]
    fn test_identifier_keeps_internal_punctuation() {
        let t = table(&["JOB_ID"], &[&["  J_01-X  "]]);
        let cleaned = FallbackCleaner::default().clean(&t);
        assert_eq!(cleaned.get(0, 0), Some("J_01-X"));
    }

    #[test]
    fn test_phone_normalization() {
        let t = table(
            &["PHONE_NUMBER"],
            &[&["555.123.4567"], &["123"], &[""], &["--"]],
        );
        let cleaned = FallbackCleaner::default().clean(&t);
        assert_eq!(cleaned.get(0, 0), Some("555-123-4567"));
        assert_eq!(cleaned.get(1, 0), Some("123"));
        assert_eq!(cleaned.get(2, 0), Some("unknown"));
        assert_eq!(cleaned.get(3, 0), Some("unknown"));
    }

    #[test]
    fn test_duplicates_removed_after_fill() {
        // Both rows become identical once the missing name is filled.
        let t = table(
            &["name", "city"],
            &[&["unknown", "Rome"], &["", "Rome"], &["Bob", "Rome"]],
        );
        let cleaned = FallbackCleaner::default().clean(&t);
        assert_eq!(cleaned.row_count(), 2);
    }

    #[test]
    fn test_temporal_column_kept_intact() {
        let t = table(&["joined"], &[&[" 2024-01-02 "], &["NaT"]]);
        let cleaned = FallbackCleaner::default().clean(&t);
        assert_eq!(cleaned.get(0, 0), Some("2024-01-02"));
        assert_eq!(cleaned.get(1, 0), Some("unknown"));
    }

    #[test]
    fn test_total_on_degenerate_tables() {
        let empty = table(&["a"], &[]);
        assert_eq!(FallbackCleaner::default().clean(&empty).row_count(), 0);

        let all_missing = table(&["a", "b"], &[&["", "nan"], &["null", ""]]);
        let cleaned = FallbackCleaner::default().clean(&all_missing);
        // Every cell filled, and the two now-identical rows collapse.
        assert_eq!(cleaned.row_count(), 1);
        assert_eq!(cleaned.get(0, 0), Some("unknown"));
        assert_eq!(cleaned.get(0, 1), Some("unknown"));
    }
}
