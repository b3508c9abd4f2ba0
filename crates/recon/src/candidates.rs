//! Candidate Builder.
//!
//! Derives the set of form-field candidates from one normalized payload.
//! The common subset (names, birth date, gender, citizenship) is derived for
//! every document type; each type then adds a disjoint extra subset.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::citizenship::{self, CitizenshipRef};
use crate::compare::canonical_gender;
use crate::config::GenderConfig;
use crate::model::{DocumentType, FormField, NormalizedOcr};

pub const PASSPORT_TYPE_RUSSIAN: &str = "russian";
pub const PASSPORT_TYPE_FOREIGN: &str = "foreign";

/// Build the candidate field map for one document. Empty values are never
/// emitted; unresolvable citizenship or gender yields no candidate at all.
pub fn build_candidates(
    document_type: DocumentType,
    ocr: &NormalizedOcr,
    citizenships: &[CitizenshipRef],
    gender: &GenderConfig,
) -> BTreeMap<FormField, String> {
    let mut out = BTreeMap::new();

    // Common subset, independent of document type
    put(&mut out, FormField::LastName, ocr.last_name.as_deref());
    put(&mut out, FormField::FirstName, ocr.first_name.as_deref());
    put(&mut out, FormField::MiddleName, ocr.middle_name.as_deref());
    put_date(&mut out, FormField::BirthDate, ocr.birth_date);
    if let Some(g) = ocr.gender.as_deref().and_then(|g| canonical_gender(g, gender)) {
        out.insert(FormField::Gender, g.to_string());
    }
    if let Some(id) = ocr
        .citizenship
        .as_deref()
        .and_then(|c| citizenship::resolve(citizenships, c))
    {
        out.insert(FormField::CitizenshipId, id);
    }

    match document_type {
        DocumentType::PassportRf => {
            out.insert(FormField::PassportType, PASSPORT_TYPE_RUSSIAN.to_string());
            if let Some(number) = ocr.passport_number.as_deref() {
                out.insert(
                    FormField::PassportNumber,
                    format_passport_number(ocr.passport_series.as_deref(), number),
                );
            }
            put_date(&mut out, FormField::PassportDate, ocr.passport_date);
            put(&mut out, FormField::PassportIssuer, ocr.passport_issuer.as_deref());
        }
        DocumentType::ForeignPassport => {
            out.insert(FormField::PassportType, PASSPORT_TYPE_FOREIGN.to_string());
            // Foreign numbers are taken as reported, no series split
            put(&mut out, FormField::PassportNumber, ocr.passport_number.as_deref());
            put_date(&mut out, FormField::PassportDate, ocr.passport_date);
            put(&mut out, FormField::PassportIssuer, ocr.passport_issuer.as_deref());
            put_date(&mut out, FormField::PassportExpiryDate, ocr.passport_expiry_date);
        }
        DocumentType::Patent => {
            put(&mut out, FormField::PatentNumber, ocr.patent_number.as_deref());
            put_date(&mut out, FormField::PatentIssueDate, ocr.patent_issue_date);
        }
        DocumentType::Kig => {
            put(&mut out, FormField::Kig, ocr.kig.as_deref());
            put_date(&mut out, FormField::KigEndDate, ocr.kig_end_date);
        }
        // Visa documents yield the common subset only
        DocumentType::Visa => {}
    }

    out
}

/// `"4510 №123456"` when a series is known, the bare number otherwise.
pub fn format_passport_number(series: Option<&str>, number: &str) -> String {
    match series.map(str::trim).filter(|s| !s.is_empty()) {
        Some(series) => format!("{series} №{}", number.trim()),
        None => number.trim().to_string(),
    }
}

fn put(out: &mut BTreeMap<FormField, String>, field: FormField, value: Option<&str>) {
    if let Some(v) = value {
        let v = v.trim();
        if !v.is_empty() {
            out.insert(field, v.to_string());
        }
    }
}

fn put_date(out: &mut BTreeMap<FormField, String>, field: FormField, value: Option<NaiveDate>) {
    if let Some(d) = value {
        out.insert(field, d.format("%Y-%m-%d").to_string());
    }
}
