//! Capability-scoped execution of generated procedures.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cleaning::rules::{format_number, normalize_phone, strip_noise};
use crate::codegen::GeneratedProcedure;
use crate::dataset::{NumericSummary, TabularDataset};
use crate::error::{RefineryError, Result};

use super::script::{Arg, Expr, Statement, parse_script};

/// The well-known name the dataset is bound under inside a procedure.
pub const DATASET_REF: &str = "df";

/// A value in the execution environment. Only tables are useful; string
/// and number bindings exist so that a procedure reassigning the dataset
/// reference to a literal fails the output contract rather than the
/// parser.
#[derive(Debug, Clone)]
enum Value {
    Table(TabularDataset),
    Str(String),
    Num(f64),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Table(_) => "table",
            Value::Str(_) => "string",
            Value::Num(_) => "number",
        }
    }
}

/// Executes a generated procedure against a private copy of a dataset.
///
/// The execution environment exposes only the allow-listed cleaning
/// operations; nothing in the procedure language can name a file, a
/// socket, or a process. After execution the output contract is checked
/// before the result is accepted: the dataset reference must still hold
/// a table with the input's exact column sequence and no additional
/// rows. Any violation discards the mutated copy.
#[derive(Debug, Clone)]
pub struct SandboxedExecutor {
    max_statements: usize,
    timeout: Duration,
}

impl SandboxedExecutor {
    pub fn new(max_statements: usize, timeout: Duration) -> Self {
        Self {
            max_statements,
            timeout,
        }
    }

    /// Run a procedure. On success returns the transformed copy; on any
    /// failure returns `ContractViolation` and the input is untouched.
    pub fn execute(
        &self,
        procedure: &GeneratedProcedure,
        dataset: &TabularDataset,
    ) -> Result<TabularDataset> {
        let statements = parse_script(procedure.text())?;

        if statements.is_empty() {
            return Err(RefineryError::ContractViolation(
                "procedure contains no executable statements".to_string(),
            ));
        }
        if statements.len() > self.max_statements {
            return Err(RefineryError::ContractViolation(format!(
                "procedure has {} statements, limit is {}",
                statements.len(),
                self.max_statements
            )));
        }

        let mut env: HashMap<String, Value> = HashMap::new();
        env.insert(DATASET_REF.to_string(), Value::Table(dataset.clone()));

        let deadline = Instant::now() + self.timeout;
        for statement in &statements {
            if Instant::now() > deadline {
                return Err(RefineryError::ContractViolation(
                    "procedure execution timed out".to_string(),
                ));
            }
            self.run_statement(statement, &mut env)?;
        }

        let result = match env.get(DATASET_REF) {
            Some(Value::Table(table)) => table.clone(),
            Some(other) => {
                return Err(RefineryError::ContractViolation(format!(
                    "'{}' was reassigned to a {}",
                    DATASET_REF,
                    other.type_name()
                )));
            }
            None => {
                return Err(RefineryError::ContractViolation(format!(
                    "'{}' is no longer bound",
                    DATASET_REF
                )));
            }
        };

        if !result.same_columns(dataset) {
            return Err(RefineryError::ContractViolation(
                "column set or order changed".to_string(),
            ));
        }
        if result.row_count() > dataset.row_count() {
            return Err(RefineryError::ContractViolation(format!(
                "row count grew from {} to {}",
                dataset.row_count(),
                result.row_count()
            )));
        }

        debug!(
            rows_in = dataset.row_count(),
            rows_out = result.row_count(),
            "procedure executed within contract"
        );
        Ok(result)
    }

    fn run_statement(&self, statement: &Statement, env: &mut HashMap<String, Value>) -> Result<()> {
        let value = match &statement.expr {
            Expr::Literal(arg) => resolve_arg(env, arg)?,
            Expr::Call { func, args } => apply_operation(env, func, args)?,
        };
        env.insert(statement.target.clone(), value);
        Ok(())
    }
}

impl Default for SandboxedExecutor {
    fn default() -> Self {
        Self::new(128, Duration::from_secs(5))
    }
}

fn violation(message: impl Into<String>) -> RefineryError {
    RefineryError::ContractViolation(message.into())
}

fn resolve_arg(env: &HashMap<String, Value>, arg: &Arg) -> Result<Value> {
    match arg {
        Arg::Ident(name) => env
            .get(name)
            .cloned()
            .ok_or_else(|| violation(format!("unknown reference '{}'", name))),
        Arg::Str(s) => Ok(Value::Str(s.clone())),
        Arg::Num(n) => Ok(Value::Num(*n)),
    }
}

/// The allow-listed operation registry: the entire capability surface
/// reachable from a procedure.
fn apply_operation(env: &HashMap<String, Value>, func: &str, args: &[Arg]) -> Result<Value> {
    let resolved: Vec<Value> = args
        .iter()
        .map(|a| resolve_arg(env, a))
        .collect::<Result<_>>()?;

    match func {
        "drop_duplicates" => {
            let mut table = expect_table(func, &resolved, 0, 1)?;
            table.dedup_rows();
            Ok(Value::Table(table))
        }
        "fill_numeric" => {
            let mut table = expect_table(func, &resolved, 0, 3)?;
            let column = expect_str(func, &resolved, 1)?;
            let strategy = expect_str(func, &resolved, 2)?;
            let col = column_index(&table, &column)?;

            let summary = NumericSummary::for_column(&table, col);
            let fill = if summary.count == 0 {
                "unknown".to_string()
            } else {
                match strategy.as_str() {
                    "mean" => format_number(summary.mean),
                    "median" => format_number(summary.median),
                    other => {
                        return Err(violation(format!(
                            "fill_numeric strategy must be \"mean\" or \"median\", got \"{}\"",
                            other
                        )));
                    }
                }
            };

            fill_missing(&mut table, col, &fill);
            Ok(Value::Table(table))
        }
        "fill_unknown" => {
            let mut table = expect_table(func, &resolved, 0, 2)?;
            let column = expect_str(func, &resolved, 1)?;
            let col = column_index(&table, &column)?;
            fill_missing(&mut table, col, "unknown");
            Ok(Value::Table(table))
        }
        "trim_whitespace" => {
            let mut table = expect_table(func, &resolved, 0, 1)?;
            for row in 0..table.row_count() {
                for col in 0..table.column_count() {
                    let trimmed = table.get(row, col).unwrap_or_default().trim().to_string();
                    table.set(row, col, trimmed);
                }
            }
            Ok(Value::Table(table))
        }
        "strip_noise" => {
            let mut table = expect_table(func, &resolved, 0, 2)?;
            let column = expect_str(func, &resolved, 1)?;
            let col = column_index(&table, &column)?;
            for row in 0..table.row_count() {
                let value = table.get(row, col).unwrap_or_default();
                if !TabularDataset::is_missing(value) {
                    let cleaned = strip_noise(value);
                    table.set(row, col, cleaned);
                }
            }
            Ok(Value::Table(table))
        }
        "normalize_phone" => {
            let mut table = expect_table(func, &resolved, 0, 2)?;
            let column = expect_str(func, &resolved, 1)?;
            let col = column_index(&table, &column)?;
            for row in 0..table.row_count() {
                let value = table.get(row, col).unwrap_or_default().to_string();
                table.set(row, col, normalize_phone(&value));
            }
            Ok(Value::Table(table))
        }
        other => Err(violation(format!("unknown operation '{}'", other))),
    }
}

fn expect_table(func: &str, args: &[Value], index: usize, arity: usize) -> Result<TabularDataset> {
    if args.len() != arity {
        return Err(violation(format!(
            "{} takes {} argument(s), got {}",
            func,
            arity,
            args.len()
        )));
    }
    match &args[index] {
        Value::Table(table) => Ok(table.clone()),
        other => Err(violation(format!(
            "{} argument {} must be a table, got {}",
            func,
            index + 1,
            other.type_name()
        ))),
    }
}

fn expect_str(func: &str, args: &[Value], index: usize) -> Result<String> {
    match &args[index] {
        Value::Str(s) => Ok(s.clone()),
        other => Err(violation(format!(
            "{} argument {} must be a string, got {}",
            func,
            index + 1,
            other.type_name()
        ))),
    }
}

fn column_index(table: &TabularDataset, column: &str) -> Result<usize> {
    table
        .column_index(column)
        .ok_or_else(|| violation(format!("column '{}' not found", column)))
}

fn fill_missing(table: &mut TabularDataset, col: usize, fill: &str) {
    for row in 0..table.row_count() {
        let value = table.get(row, col).unwrap_or_default();
        if TabularDataset::is_missing(value) {
            table.set(row, col, fill.to_string());
        }
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

    fn procedure(text: &str) -> GeneratedProcedure {
        GeneratedProcedure::new(text)
    }

    #[test]
    fn test_full_procedure() {
        let input = table(
            &["name", "age", "PHONE_NUMBER"],
            &[
                &[" Alice ", "30", "555.123.4567"],
                &["Bob", "", "123"],
                &["Bob", "", "123"],
            ],
        );
        let script = "\
df = trim_whitespace(df)
df = fill_numeric(df, \"age\", \"mean\")
df = fill_unknown(df, \"name\")
df = normalize_phone(df, \"PHONE_NUMBER\")
df = drop_duplicates(df)
";
        let result = SandboxedExecutor::default()
            .execute(&procedure(script), &input)
            .unwrap();

        assert_eq!(result.row_count(), 2);
        assert_eq!(result.get(0, 0), Some("Alice"));
        assert_eq!(result.get(1, 1), Some("30"));
        assert_eq!(result.get(0, 2), Some("555-123-4567"));
    }

    #[test]
    fn test_unknown_operation_rejected() {
        let input = table(&["a"], &[&["1"]]);
        let err = SandboxedExecutor::default()
            .execute(&procedure("df = open(\"/etc/passwd\")"), &input)
            .unwrap_err();
        assert!(matches!(err, RefineryError::ContractViolation(_)));
        assert!(err.to_string().contains("unknown operation"));
    }

    #[test]
    fn test_reassignment_to_literal_fails_contract() {
        let input = table(&["a"], &[&["1"]]);
        let err = SandboxedExecutor::default()
            .execute(&procedure("df = \"not a table\""), &input)
            .unwrap_err();
        assert!(err.to_string().contains("reassigned"));
    }

    #[test]
    fn test_missing_column_is_execution_failure() {
        let input = table(&["a"], &[&["1"]]);
        let err = SandboxedExecutor::default()
            .execute(&procedure("df = fill_unknown(df, \"zzz\")"), &input)
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_empty_procedure_rejected() {
        let input = table(&["a"], &[&["1"]]);
        let err = SandboxedExecutor::default()
            .execute(&procedure("# nothing here\n"), &input)
            .unwrap_err();
        assert!(err.to_string().contains("no executable statements"));
    }

    #[test]
    fn test_statement_budget_enforced() {
        let input = table(&["a"], &[&["1"]]);
        let script = "df = drop_duplicates(df)\n".repeat(200);
        let executor = SandboxedExecutor::new(128, Duration::from_secs(5));
        let err = executor.execute(&procedure(&script), &input).unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn test_input_untouched_on_failure() {
        let input = table(&["a"], &[&[" raw "]]);
        let _ = SandboxedExecutor::default()
            .execute(
                &procedure("df = trim_whitespace(df)\ndf = explode(df)"),
                &input,
            )
            .unwrap_err();
        assert_eq!(input.get(0, 0), Some(" raw "));
    }

    #[test]
    fn test_intermediate_bindings_allowed() {
        // A procedure may stage work under another name as long as the
        // dataset reference ends up holding the result.
        let input = table(&["a"], &[&[" x "], &[" x "]]);
        let script = "tmp = trim_whitespace(df)\ndf = drop_duplicates(tmp)";
        let result = SandboxedExecutor::default()
            .execute(&procedure(script), &input)
            .unwrap();
        assert_eq!(result.row_count(), 1);
        assert_eq!(result.get(0, 0), Some("x"));
    }
}
