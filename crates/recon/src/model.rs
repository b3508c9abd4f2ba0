use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

/// Closed set of recognizable identity documents. Determines which candidate
/// fields are derivable and which comparison rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    PassportRf,
    ForeignPassport,
    Patent,
    Kig,
    Visa,
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PassportRf => write!(f, "passport_rf"),
            Self::ForeignPassport => write!(f, "foreign_passport"),
            Self::Patent => write!(f, "patent"),
            Self::Kig => write!(f, "kig"),
            Self::Visa => write!(f, "visa"),
        }
    }
}

// ---------------------------------------------------------------------------
// Form fields
// ---------------------------------------------------------------------------

/// Canonical employee-form fields the engine may propose values for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    LastName,
    FirstName,
    MiddleName,
    BirthDate,
    Gender,
    CitizenshipId,
    PassportType,
    PassportNumber,
    PassportDate,
    PassportIssuer,
    PassportExpiryDate,
    PatentNumber,
    PatentIssueDate,
    Kig,
    KigEndDate,
}

/// Comparison rule selector for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Gender,
    PassportNumber,
    ReferenceId,
}

impl FormField {
    pub const ALL: [FormField; 15] = [
        Self::LastName,
        Self::FirstName,
        Self::MiddleName,
        Self::BirthDate,
        Self::Gender,
        Self::CitizenshipId,
        Self::PassportType,
        Self::PassportNumber,
        Self::PassportDate,
        Self::PassportIssuer,
        Self::PassportExpiryDate,
        Self::PatentNumber,
        Self::PatentIssueDate,
        Self::Kig,
        Self::KigEndDate,
    ];

    /// Wire name, matching the form layer's field keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastName => "lastName",
            Self::FirstName => "firstName",
            Self::MiddleName => "middleName",
            Self::BirthDate => "birthDate",
            Self::Gender => "gender",
            Self::CitizenshipId => "citizenshipId",
            Self::PassportType => "passportType",
            Self::PassportNumber => "passportNumber",
            Self::PassportDate => "passportDate",
            Self::PassportIssuer => "passportIssuer",
            Self::PassportExpiryDate => "passportExpiryDate",
            Self::PatentNumber => "patentNumber",
            Self::PatentIssueDate => "patentIssueDate",
            Self::Kig => "kig",
            Self::KigEndDate => "kigEndDate",
        }
    }

    /// Human label shown next to a conflict entry.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LastName => "Фамилия",
            Self::FirstName => "Имя",
            Self::MiddleName => "Отчество",
            Self::BirthDate => "Дата рождения",
            Self::Gender => "Пол",
            Self::CitizenshipId => "Гражданство",
            Self::PassportType => "Тип паспорта",
            Self::PassportNumber => "Серия и номер паспорта",
            Self::PassportDate => "Дата выдачи паспорта",
            Self::PassportIssuer => "Кем выдан",
            Self::PassportExpiryDate => "Срок действия паспорта",
            Self::PatentNumber => "Номер патента",
            Self::PatentIssueDate => "Дата выдачи патента",
            Self::Kig => "Номер КИГ",
            Self::KigEndDate => "Срок действия КИГ",
        }
    }

    /// Which comparison rule applies to this field.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::BirthDate
            | Self::PassportDate
            | Self::PassportExpiryDate
            | Self::PatentIssueDate
            | Self::KigEndDate => FieldKind::Date,
            Self::Gender => FieldKind::Gender,
            Self::PassportNumber => FieldKind::PassportNumber,
            Self::CitizenshipId => FieldKind::ReferenceId,
            _ => FieldKind::Text,
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Raw recognizer payload
// ---------------------------------------------------------------------------

/// Opaque payload from the external recognizer. All parts are optional and
/// provider-specific; the normalizer enumerates every key it understands.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecognitionResult {
    /// Primary normalized-field object (free-form keys).
    #[serde(default)]
    pub normalized: Option<serde_json::Value>,
    /// Already-structured raw provider JSON, fallback source only.
    #[serde(default)]
    pub json: Option<serde_json::Value>,
    /// Raw provider response as a string, parsed leniently as a last resort.
    #[serde(default)]
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalized values
// ---------------------------------------------------------------------------

/// Canonical field values extracted from one recognition payload.
/// `None` means the recognizer reported nothing for the field; it is never
/// conflated with an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedOcr {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Raw citizenship code or name, pre-resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citizenship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patent_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patent_issue_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kig_end_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// User decision on a single conflicted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Keep,
    Replace,
}

impl Default for Decision {
    fn default() -> Self {
        Self::Keep
    }
}

/// A candidate whose value differs from a non-empty current form value.
/// Mutable only while the owning session is pending; the non-destructive
/// default is `Keep`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictEntry {
    pub field: FormField,
    pub label: String,
    pub current: String,
    pub ocr: String,
    pub decision: Decision,
}

/// Output of one classification pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifyOutput {
    pub auto_fill: BTreeMap<FormField, String>,
    pub conflicts: Vec<ConflictEntry>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Identifies one recognition attempt. A completion carrying any token other
/// than the live one is stale and must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunToken(pub(crate) u64);

/// Context of one reconciliation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionRequest {
    pub employee_id: String,
    pub file_id: String,
    pub provider: String,
    pub document_type: DocumentType,
}

/// Externally observable session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    PendingConflicts,
}

/// Terminal of one completed recognition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No conflicts; values written and confirmed.
    AutoFilled { filled: usize },
    /// Recognition succeeded but produced no candidate values; confirmed.
    NoData,
    /// Conflicts await user decisions.
    Conflicts { count: usize },
    /// The completion belonged to a cancelled or superseded run; ignored.
    Stale,
}
