use chrono::NaiveDate;

use crate::config::GenderConfig;
use crate::model::{FieldKind, FormField};

/// Date spellings the recognizers and the form are known to produce.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y.%m.%d"];

/// Parse a calendar date from any known spelling. Timestamps are cut down to
/// their date part first. Unparseable input is `None`, never an error.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Normalize to `YYYY-MM-DD`; invalid dates normalize to empty.
pub fn canonical_date(value: &str) -> String {
    parse_date(value)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Map a gender spelling through the canonical table.
pub fn canonical_gender(value: &str, gender: &GenderConfig) -> Option<&'static str> {
    let v = value.trim().to_lowercase();
    if gender.male.iter().any(|m| m.to_lowercase() == v) {
        Some("male")
    } else if gender.female.iter().any(|f| f.to_lowercase() == v) {
        Some("female")
    } else {
        None
    }
}

/// Strip everything but digits (passport formatting: spaces, `№`, dashes).
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Field-type-aware equality between a current form value and a candidate.
pub fn equal(field: FormField, current: &str, candidate: &str, gender: &GenderConfig) -> bool {
    match field.kind() {
        FieldKind::Date => canonical_date(current) == canonical_date(candidate),
        FieldKind::Gender => {
            let a = canonical_gender(current, gender);
            let b = canonical_gender(candidate, gender);
            match (a, b) {
                (Some(a), Some(b)) => a == b,
                // Unmapped spellings fall back to plain string comparison
                _ => eq_text(current, candidate),
            }
        }
        FieldKind::PassportNumber => digits_only(current) == digits_only(candidate),
        // Resolved reference ids are opaque; compare verbatim after trim
        FieldKind::ReferenceId => current.trim() == candidate.trim(),
        FieldKind::Text => eq_text(current, candidate),
    }
}

fn eq_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// A value is empty when blank after trim, or, for date fields, when it is
/// structurally invalid as a calendar date.
pub fn is_empty(field: FormField, value: &str) -> bool {
    if value.trim().is_empty() {
        return true;
    }
    match field.kind() {
        FieldKind::Date => parse_date(value).is_none(),
        _ => false,
    }
}
