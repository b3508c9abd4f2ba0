//! Classifier.
//!
//! Walks current form state against the candidate map and partitions fields
//! into auto-fill (target empty), silently-equal (dropped) and conflicts
//! (target non-empty and different, surfaced for human arbitration).

use std::collections::BTreeMap;

use crate::compare::{equal, is_empty};
use crate::config::GenderConfig;
use crate::model::{ClassifyOutput, ConflictEntry, Decision, FormField};

/// Classify candidates against a form snapshot.
///
/// `passportType` is a coarse classifier field: filled when empty, never
/// arbitrated. If the primary pass places nothing anywhere yet candidates
/// exist, candidates targeting still-empty fields are re-applied as
/// auto-fill; fields holding a non-empty value are never touched by the
/// re-apply, so it can neither bypass a conflict nor rewrite an equal value.
pub fn classify(
    candidates: &BTreeMap<FormField, String>,
    snapshot: &BTreeMap<FormField, String>,
    gender: &GenderConfig,
) -> ClassifyOutput {
    let mut out = ClassifyOutput::default();

    for (&field, candidate) in candidates {
        if is_empty(field, candidate) {
            continue;
        }
        let current = snapshot.get(&field).map(String::as_str).unwrap_or("");

        if field == FormField::PassportType {
            if is_empty(field, current) {
                out.auto_fill.insert(field, candidate.clone());
            }
            continue;
        }

        if is_empty(field, current) {
            out.auto_fill.insert(field, candidate.clone());
        } else if equal(field, current, candidate, gender) {
            // Same value under field-specific equality: nothing to report
        } else {
            out.conflicts.push(ConflictEntry {
                field,
                label: field.label().to_string(),
                current: current.to_string(),
                ocr: candidate.clone(),
                decision: Decision::Keep,
            });
        }
    }

    if out.auto_fill.is_empty() && out.conflicts.is_empty() && !candidates.is_empty() {
        out.auto_fill = candidates
            .iter()
            .filter(|(field, value)| !is_empty(**field, value))
            .filter(|(field, _)| {
                let current = snapshot.get(*field).map(String::as_str).unwrap_or("");
                is_empty(**field, current)
            })
            .map(|(field, value)| (*field, value.clone()))
            .collect();
    }

    out
}
