//! Property-based tests for the fallback cleaner and the sandbox.
//!
//! These verify the invariants that hold for every input:
//! 1. **Totality**: the fallback cleaner never panics and never fails
//! 2. **Structure**: columns are preserved exactly; rows never grow
//! 3. **Completeness**: no missing-value sentinel survives cleaning
//! 4. **Containment**: arbitrary procedure text either parses into the
//!    operation language or is rejected; accepted output honors the
//!    structural contract

use std::time::Duration;

use proptest::collection::vec;
use proptest::prelude::*;

use refinery::sandbox::script::parse_script;
use refinery::{FallbackCleaner, GeneratedProcedure, SandboxedExecutor, TabularDataset};

// =============================================================================
// Test Strategies
// =============================================================================

/// Cell values mixing ordinary text, numbers, noise, and missing
/// sentinels.
fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z]{1,12}",
        "-?[0-9]{1,6}(\\.[0-9]{1,3})?",
        "\\s{0,3}[a-zA-Z!#$%]{1,10}\\s{0,3}",
        Just(String::new()),
        Just("null".to_string()),
        Just("NaN".to_string()),
        Just("n/a".to_string()),
    ]
}

fn column_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{2,10}",
        Just("email".to_string()),
        Just("phone".to_string()),
        Just("user_id".to_string()),
    ]
}

/// Arbitrary rectangular datasets: 1-5 columns, 0-20 rows.
fn dataset() -> impl Strategy<Value = TabularDataset> {
    (1usize..=5).prop_flat_map(|width| {
        (
            vec(column_name(), width),
            vec(vec(cell(), width), 0..=20),
        )
            .prop_map(|(mut columns, rows)| {
                // Column names must be unique for lookups to be stable.
                for (i, name) in columns.iter_mut().enumerate() {
                    name.push_str(&format!("_{}", i));
                }
                TabularDataset::new(columns, rows).unwrap()
            })
    })
}

// =============================================================================
// Fallback Cleaner Invariants
// =============================================================================

proptest! {
    #[test]
    fn prop_fallback_preserves_columns(table in dataset()) {
        let cleaned = FallbackCleaner::default().clean(&table);
        prop_assert_eq!(cleaned.column_names(), table.column_names());
    }

    #[test]
    fn prop_fallback_never_grows_rows(table in dataset()) {
        let cleaned = FallbackCleaner::default().clean(&table);
        prop_assert!(cleaned.row_count() <= table.row_count());
    }

    #[test]
    fn prop_fallback_leaves_no_missing_sentinels(table in dataset()) {
        let cleaned = FallbackCleaner::default().clean(&table);
        for row in 0..cleaned.row_count() {
            for col in 0..cleaned.column_count() {
                let value = cleaned.get(row, col).unwrap();
                prop_assert!(
                    !TabularDataset::is_missing(value),
                    "missing sentinel '{}' survived at ({}, {})",
                    value,
                    row,
                    col
                );
            }
        }
    }

    #[test]
    fn prop_fallback_is_deterministic(table in dataset()) {
        let cleaner = FallbackCleaner::default();
        prop_assert_eq!(cleaner.clean(&table), cleaner.clean(&table));
    }

    #[test]
    fn prop_fallback_output_has_no_duplicate_rows(table in dataset()) {
        let cleaned = FallbackCleaner::default().clean(&table);
        let mut seen = std::collections::HashSet::new();
        for row in 0..cleaned.row_count() {
            let cells: Vec<&str> = (0..cleaned.column_count())
                .map(|col| cleaned.get(row, col).unwrap())
                .collect();
            prop_assert!(seen.insert(cells), "duplicate row survived");
        }
    }
}

// =============================================================================
// Procedure Language and Sandbox Invariants
// =============================================================================

proptest! {
    #[test]
    fn prop_parser_never_panics(text in "\\PC{0,200}") {
        let _ = parse_script(&text);
    }

    #[test]
    fn prop_executor_output_honors_contract(
        table in dataset(),
        text in prop_oneof![
            "\\PC{0,120}",
            Just("df = drop_duplicates(df)".to_string()),
            Just("df = trim_whitespace(df)\ndf = drop_duplicates(df)".to_string()),
            Just("df = fill_unknown(df, \"email_0\")".to_string()),
        ],
    ) {
        let executor = SandboxedExecutor::new(128, Duration::from_secs(5));
        let procedure = GeneratedProcedure::new(text);
        if let Ok(cleaned) = executor.execute(&procedure, &table) {
            prop_assert_eq!(cleaned.column_names(), table.column_names());
            prop_assert!(cleaned.row_count() <= table.row_count());
        }
    }

    #[test]
    fn prop_executor_never_mutates_input(table in dataset(), text in "\\PC{0,120}") {
        let executor = SandboxedExecutor::default();
        let before = table.clone();
        let _ = executor.execute(&GeneratedProcedure::new(text), &table);
        prop_assert_eq!(table, before);
    }
}
