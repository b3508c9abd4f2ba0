//! Field Normalizer.
//!
//! Converts an arbitrary raw recognition payload into [`NormalizedOcr`].
//! Deliberately infallible: malformed or incomplete payloads degrade to
//! absent fields so a bad recognition never blocks the rest of the form.

use serde_json::{Map, Value};

use crate::compare::{digits_only, parse_date};
use crate::config::AliasConfig;
use crate::model::{NormalizedOcr, RawRecognitionResult};

/// Normalize a raw recognizer payload. Pure: same input, same output.
pub fn normalize(raw: &RawRecognitionResult, aliases: &AliasConfig) -> NormalizedOcr {
    let primary = match raw.normalized.as_ref().and_then(Value::as_object) {
        Some(obj) => obj,
        // No primary object: no candidates are derivable at all
        None => return NormalizedOcr::default(),
    };
    let fallback = fallback_object(raw);

    let (passport_series, passport_number) =
        resolve_passport_parts(primary, fallback.as_ref(), aliases);

    NormalizedOcr {
        last_name: lookup(primary, &aliases.last_name),
        first_name: lookup(primary, &aliases.first_name),
        middle_name: lookup(primary, &aliases.middle_name),
        birth_date: lookup(primary, &aliases.birth_date).and_then(|v| parse_date(&v)),
        gender: lookup(primary, &aliases.gender),
        citizenship: lookup(primary, &aliases.citizenship),
        passport_series,
        passport_number,
        passport_date: lookup(primary, &aliases.passport_date).and_then(|v| parse_date(&v)),
        passport_issuer: lookup(primary, &aliases.passport_issuer),
        passport_expiry_date: lookup(primary, &aliases.passport_expiry_date)
            .and_then(|v| parse_date(&v)),
        patent_number: lookup(primary, &aliases.patent_number),
        patent_issue_date: lookup(primary, &aliases.patent_issue_date)
            .and_then(|v| parse_date(&v)),
        kig: lookup(primary, &aliases.kig),
        kig_end_date: lookup(primary, &aliases.kig_end_date).and_then(|v| parse_date(&v)),
    }
}

/// Secondary source for fields the primary payload commonly omits.
/// Structured `json` wins; otherwise `content` is parsed best-effort.
/// Parse failure yields no fallback, not an error.
fn fallback_object(raw: &RawRecognitionResult) -> Option<Map<String, Value>> {
    if let Some(obj) = raw.json.as_ref().and_then(Value::as_object) {
        return Some(obj.clone());
    }
    let content = raw.content.as_deref()?;
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

/// First alias present with a non-empty value wins. Numbers are accepted and
/// stringified (providers report document numbers both ways).
fn lookup(obj: &Map<String, Value>, keys: &[String]) -> Option<String> {
    for key in keys {
        let value = match obj.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => continue,
        };
        if !value.is_empty() {
            return Some(value);
        }
    }
    None
}

/// Resolve passport series/number, consulting the fallback payload and the
/// combined-digit-string split policy.
///
/// Split policy for a combined string: with ≥ 10 digits the first 4 are the
/// series and the next 6 the number; anything shorter is a number only,
/// since a wrong series is worse than no series. A known series with a number that
/// came out shorter than 6 digits is re-derived from the combined string
/// when one is long enough.
fn resolve_passport_parts(
    primary: &Map<String, Value>,
    fallback: Option<&Map<String, Value>>,
    aliases: &AliasConfig,
) -> (Option<String>, Option<String>) {
    let pick = |keys: &[String]| {
        lookup(primary, keys).or_else(|| fallback.and_then(|f| lookup(f, keys)))
    };

    let mut series = pick(&aliases.passport_series);
    let mut number = pick(&aliases.passport_number);
    let combined = pick(&aliases.passport_combined).map(|c| digits_only(&c));
    let combined = combined.filter(|c| !c.is_empty());

    if let Some(digits) = combined {
        let number_too_short = number
            .as_deref()
            .map(|n| digits_only(n).len() < 6)
            .unwrap_or(false);

        if number.is_none() {
            if digits.len() >= 10 {
                if series.is_none() {
                    series = Some(digits[..4].to_string());
                }
                number = Some(digits[4..10].to_string());
            } else {
                number = Some(digits);
            }
        } else if series.is_some() && number_too_short && digits.len() >= 10 {
            number = Some(digits[4..10].to_string());
        }
    }

    (series, number)
}
