//! Instruction templates for collaborator interactions.

use crate::dataset::SampleBrief;

/// System prompt for all Refinery collaborator interactions.
pub fn system_prompt() -> &'static str {
    "You are a careful data cleaning assistant working on tabular datasets. \
     Follow the output format in each request exactly: no markdown, no \
     commentary, no acknowledgements beyond what the request asks for."
}

/// Build the feasibility instruction from named dataset briefs.
///
/// The collaborator must answer with a bare TRUE or FALSE about whether
/// the tables are semantically connected enough to process as one corpus.
pub fn feasibility_prompt(briefs: &[(String, String)]) -> String {
    let mut prompt = String::from(
        "You are given schemas and samples for a set of tables. Decide whether \
         the tables are semantically connected so they can be jointly processed.\n\
         - If there is just one non-empty table, answer TRUE.\n\
         - Answer TRUE if two or more tables are logically connected.\n\
         - Answer FALSE only if no table has any connection to any other.\n\
         The only response you may give is the single word TRUE or FALSE. \
         Do not reveal your reasoning.\n\n",
    );

    for (name, brief) in briefs {
        prompt.push_str(&format!("Table: {}\n{}\n\n", name, brief));
    }

    prompt
}

/// Build the cleaning-procedure instruction for one dataset.
///
/// The response must be a procedure in the sandbox's operation language:
/// one statement per line, each reassigning the dataset reference `df`.
pub fn cleaning_prompt(brief: &SampleBrief) -> String {
    format!(
        r#"Write a cleaning procedure for the dataset described below.

The procedure language allows exactly these statements, one per line,
each assigning back to the dataset reference `df`:

    df = drop_duplicates(df)
    df = fill_numeric(df, "column", "mean")
    df = fill_numeric(df, "column", "median")
    df = fill_unknown(df, "column")
    df = trim_whitespace(df)
    df = strip_noise(df, "column")
    df = normalize_phone(df, "column")

Cleaning rules the procedure must satisfy:
1. Keep every column: never add, remove, rename, or reorder columns.
2. Numeric columns: fill missing values with the column mean, or the
   median when the distribution is clearly skewed.
3. Text and date columns: fill missing or sentinel values (null, none,
   nan, empty) with "unknown" using fill_unknown.
4. Remove duplicate rows with drop_duplicates; never remove other rows.
5. Trim leading/trailing whitespace with trim_whitespace.
6. Strip noise characters from generic text columns with strip_noise,
   but NOT from email or identifier-code columns (those are trimmed only).
7. If a phone-number column exists, normalize it with normalize_phone.
8. Only reference columns that exist in the schema below.

Dataset:
{}

Return only the procedure lines. No markdown fences, comments, or
explanations."#,
        brief.to_prompt_string()
    )
}

/// Build the quality-check instruction over a fully serialized dataset.
///
/// The collaborator must lead with GOOD or BAD, then one paragraph of
/// rationale.
pub fn quality_prompt(csv: &str) -> String {
    format!(
        r#"You are a strict data quality checker. Examine this cleaned CSV and
assess:
- Is the data usable for analysis?
- Is there evidence of data loss?
- Are there remaining missing, null, or malformed values?
- Are the expected columns present?

Data:
{}

Respond with the single word GOOD or BAD, followed by a one-paragraph
explanation."#,
        csv
    )
}
