//! Cell-level cleaning rules shared by the fallback cleaner and the
//! sandbox operations.

use once_cell::sync::Lazy;
use regex::Regex;

// Noise stripping keeps word characters, whitespace, and the @ . -
// characters that legitimately appear in free text.
static NOISE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s@.\-]").unwrap());

static NON_DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D").unwrap());

/// Special handling applied to a text-like column based on its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    /// Email address column: whitespace trimmed, characters preserved.
    Email,
    /// Identifier code column: whitespace trimmed, internal punctuation
    /// preserved.
    Identifier,
    /// Phone number column: normalized to digits, reformatted when
    /// exactly ten digits remain.
    Phone,
    /// Any other text column: trimmed and noise-stripped.
    Generic,
}

/// Classify a column by name. Recognition is name-based, matching how
/// the columns arrive from typical spreadsheet exports (EMAIL,
/// PHONE_NUMBER, JOB_ID, ...). Absence of any recognized column is fine;
/// the role then simply never applies.
pub fn text_role(column_name: &str) -> TextRole {
    let lc = column_name.trim().to_lowercase();
    if lc.contains("email") || lc.contains("e-mail") {
        TextRole::Email
    } else if lc.contains("phone") {
        TextRole::Phone
    } else if lc == "id" || lc.ends_with("_id") || lc.ends_with("-id") || lc.ends_with(" id") {
        TextRole::Identifier
    } else {
        TextRole::Generic
    }
}

/// Strip noise characters from a generic text cell and trim it.
pub fn strip_noise(value: &str) -> String {
    NOISE_RE.replace_all(value, "").trim().to_string()
}

/// Normalize a phone number cell: keep digits only, format as
/// XXX-XXX-XXXX when exactly ten digits remain, otherwise return the
/// digit string, or "unknown" when nothing remains.
pub fn normalize_phone(value: &str) -> String {
    let digits = NON_DIGIT_RE.replace_all(value, "");
    if digits.len() == 10 {
        format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else if digits.is_empty() {
        "unknown".to_string()
    } else {
        digits.into_owned()
    }
}

/// Format an imputed numeric value back into a cell string. Integral
/// values print without a decimal point; fractional values are rounded
/// to four decimal places with trailing zeros dropped.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.4}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
