use std::cell::RefCell;
use std::path::PathBuf;

use anketa_recon::{
    CitizenshipRef, ConfirmSink, Decision, DocumentType, EngineConfig, FormField, MemoryForm,
    NormalizedOcr, RawRecognitionResult, RecognitionProvider, RecognitionRequest, ReconError,
    Reconciler, RunOutcome, SessionStatus,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(name: &str) -> RawRecognitionResult {
    let path = fixtures_dir().join(name);
    let data = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&data).unwrap()
}

/// Provider serving a fixture file, optionally failing instead.
struct FixtureProvider {
    fixture: Option<&'static str>,
}

impl RecognitionProvider for FixtureProvider {
    fn recognize(
        &self,
        _document_type: DocumentType,
        _file_id: &str,
    ) -> Result<RawRecognitionResult, ReconError> {
        match self.fixture {
            Some(name) => Ok(load_fixture(name)),
            None => Err(ReconError::Recognition("connection reset".into())),
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    confirmed: RefCell<Vec<(String, String, String, NormalizedOcr)>>,
}

impl ConfirmSink for RecordingSink {
    fn confirm(
        &self,
        employee_id: &str,
        file_id: &str,
        provider: &str,
        normalized: &NormalizedOcr,
    ) -> Result<(), ReconError> {
        self.confirmed.borrow_mut().push((
            employee_id.to_string(),
            file_id.to_string(),
            provider.to_string(),
            normalized.clone(),
        ));
        Ok(())
    }
}

fn citizenships() -> Vec<CitizenshipRef> {
    vec![
        CitizenshipRef {
            id: "1".into(),
            code: "RUS".into(),
            name: "Российская Федерация".into(),
        },
        CitizenshipRef {
            id: "2".into(),
            code: "UZB".into(),
            name: "Узбекистан".into(),
        },
    ]
}

fn reconciler() -> Reconciler {
    Reconciler::new(EngineConfig::default(), citizenships())
}

fn request(document_type: DocumentType) -> RecognitionRequest {
    RecognitionRequest {
        employee_id: "emp_42".into(),
        file_id: "file_7".into(),
        provider: "vision".into(),
        document_type,
    }
}

// -------------------------------------------------------------------------
// End-to-end paths
// -------------------------------------------------------------------------

#[test]
fn empty_form_is_fully_auto_filled() {
    // Empty current value + non-empty candidate: auto-fill, no conflict
    let mut r = reconciler();
    let mut form = MemoryForm::new();
    let sink = RecordingSink::default();
    let provider = FixtureProvider { fixture: Some("passport_rf.json") };

    let outcome = r
        .run(request(DocumentType::PassportRf), &provider, &mut form, &sink)
        .unwrap();
    assert!(matches!(outcome, RunOutcome::AutoFilled { .. }));

    assert_eq!(form.value(FormField::LastName), "Иванов");
    assert_eq!(form.value(FormField::FirstName), "Иван");
    assert_eq!(form.value(FormField::MiddleName), "Иванович");
    assert_eq!(form.value(FormField::BirthDate), "1990-05-01");
    assert_eq!(form.value(FormField::Gender), "male");
    assert_eq!(form.value(FormField::CitizenshipId), "1");
    assert_eq!(form.value(FormField::PassportType), "russian");
    // Formatted from resolved series + number
    assert_eq!(form.value(FormField::PassportNumber), "4510 №123456");
    assert_eq!(form.value(FormField::PassportDate), "2010-06-15");

    let confirmed = sink.confirmed.borrow();
    assert_eq!(confirmed.len(), 1);
    let (emp, file, provider_name, normalized) = &confirmed[0];
    assert_eq!(emp, "emp_42");
    assert_eq!(file, "file_7");
    assert_eq!(provider_name, "vision");
    assert_eq!(normalized.passport_series.as_deref(), Some("4510"));
}

#[test]
fn matching_values_produce_no_conflicts() {
    // Values equal under field-specific rules land in neither set
    let mut r = reconciler();
    let mut form = MemoryForm::new()
        .with_value(FormField::BirthDate, "1990-05-01")
        .with_value(FormField::LastName, "ИВАНОВ")
        .with_value(FormField::PassportNumber, "4510123456");
    let before = form.clone();
    let sink = RecordingSink::default();
    let provider = FixtureProvider { fixture: Some("passport_rf.json") };

    let outcome = r
        .run(request(DocumentType::PassportRf), &provider, &mut form, &sink)
        .unwrap();
    assert!(matches!(outcome, RunOutcome::AutoFilled { .. }));
    assert_eq!(r.status(), SessionStatus::Idle);

    // Equal fields were left byte-for-byte as they were
    assert_eq!(form.value(FormField::BirthDate), before.value(FormField::BirthDate));
    assert_eq!(form.value(FormField::LastName), before.value(FormField::LastName));
    assert_eq!(
        form.value(FormField::PassportNumber),
        before.value(FormField::PassportNumber)
    );
    // Genuinely empty fields still filled
    assert_eq!(form.value(FormField::FirstName), "Иван");
}

#[test]
fn keep_decisions_leave_form_untouched() {
    // All decisions keep: conflicted fields stay byte-for-byte unchanged
    let mut r = reconciler();
    let mut form = MemoryForm::new()
        .with_value(FormField::LastName, "Петров")
        .with_value(FormField::Gender, "female");
    let sink = RecordingSink::default();
    let provider = FixtureProvider { fixture: Some("passport_rf.json") };

    let outcome = r
        .run(request(DocumentType::PassportRf), &provider, &mut form, &sink)
        .unwrap();
    assert_eq!(outcome, RunOutcome::Conflicts { count: 2 });

    // Current "female" vs recognized "male", default keep
    let genders: Vec<_> = r
        .conflicts()
        .iter()
        .filter(|c| c.field == FormField::Gender)
        .collect();
    assert_eq!(genders.len(), 1);
    assert_eq!(genders[0].current, "female");
    assert_eq!(genders[0].ocr, "male");
    assert_eq!(genders[0].decision, Decision::Keep);
    assert_eq!(genders[0].label, "Пол");

    r.apply(&mut form, &sink).unwrap();
    assert_eq!(form.value(FormField::LastName), "Петров");
    assert_eq!(form.value(FormField::Gender), "female");
    assert_eq!(sink.confirmed.borrow().len(), 1);
}

#[test]
fn replace_writes_exactly_one_field() {
    // Replace on one field writes its ocr value, all other fields untouched
    let mut r = reconciler();
    let mut form = MemoryForm::new()
        .with_value(FormField::LastName, "Петров")
        .with_value(FormField::Gender, "female");
    let sink = RecordingSink::default();
    let provider = FixtureProvider { fixture: Some("passport_rf.json") };

    r.run(request(DocumentType::PassportRf), &provider, &mut form, &sink)
        .unwrap();
    r.set_decision(FormField::LastName, Decision::Replace).unwrap();
    r.apply(&mut form, &sink).unwrap();

    assert_eq!(form.value(FormField::LastName), "Иванов");
    // The keep conflict stayed as it was
    assert_eq!(form.value(FormField::Gender), "female");
}

#[test]
fn combined_digit_string_is_split() {
    // 11-digit combined string, no discrete series field
    let mut r = reconciler();
    let mut form = MemoryForm::new();
    let sink = RecordingSink::default();
    let provider = FixtureProvider { fixture: Some("passport_combined.json") };

    r.run(request(DocumentType::PassportRf), &provider, &mut form, &sink)
        .unwrap();
    assert_eq!(form.value(FormField::PassportNumber), "4510 №123456");
}

#[test]
fn recognition_failure_surfaces_once_and_resets() {
    let mut r = reconciler();
    let mut form = MemoryForm::new();
    let sink = RecordingSink::default();
    let provider = FixtureProvider { fixture: None };

    let err = r
        .run(request(DocumentType::PassportRf), &provider, &mut form, &sink)
        .unwrap_err();
    assert!(err.to_string().contains("connection reset"));
    assert_eq!(r.status(), SessionStatus::Idle);
    assert_eq!(form, MemoryForm::new());
    assert!(sink.confirmed.borrow().is_empty());

    // No candidate data retained: a fresh run over good data works
    let provider = FixtureProvider { fixture: Some("passport_rf.json") };
    let outcome = r
        .run(request(DocumentType::PassportRf), &provider, &mut form, &sink)
        .unwrap();
    assert!(matches!(outcome, RunOutcome::AutoFilled { .. }));
}

#[test]
fn foreign_passport_keeps_number_unsplit() {
    let mut r = reconciler();
    let mut form = MemoryForm::new();
    let sink = RecordingSink::default();
    let provider = FixtureProvider { fixture: Some("foreign_passport.json") };

    r.run(request(DocumentType::ForeignPassport), &provider, &mut form, &sink)
        .unwrap();
    assert_eq!(form.value(FormField::PassportType), "foreign");
    assert_eq!(form.value(FormField::PassportNumber), "AB1234567");
    assert_eq!(form.value(FormField::PassportExpiryDate), "2029-03-10");
    // nationality fallback resolved against the reference list
    assert_eq!(form.value(FormField::CitizenshipId), "2");
}

#[test]
fn patent_only_fills_patent_fields() {
    let mut r = reconciler();
    let mut form = MemoryForm::new();
    let sink = RecordingSink::default();
    let provider = FixtureProvider { fixture: Some("patent.json") };

    r.run(request(DocumentType::Patent), &provider, &mut form, &sink)
        .unwrap();
    assert_eq!(form.value(FormField::PatentNumber), "77 2412345678");
    assert_eq!(form.value(FormField::PatentIssueDate), "2024-02-01");
    assert_eq!(form.value(FormField::PassportNumber), "");
    assert_eq!(form.value(FormField::PassportType), "");
}

#[test]
fn content_string_fallback_fills_passport_number() {
    let mut r = reconciler();
    let mut form = MemoryForm::new();
    let sink = RecordingSink::default();
    let provider = FixtureProvider { fixture: Some("content_fallback.json") };

    r.run(request(DocumentType::PassportRf), &provider, &mut form, &sink)
        .unwrap();
    assert_eq!(form.value(FormField::PassportNumber), "4510 №123456");
    assert_eq!(form.value(FormField::PassportDate), "2010-06-15");
}

#[test]
fn empty_payload_confirms_with_no_data() {
    let mut r = reconciler();
    let mut form = MemoryForm::new().with_value(FormField::LastName, "Петров");
    let sink = RecordingSink::default();
    let provider = FixtureProvider { fixture: Some("no_data.json") };

    let outcome = r
        .run(request(DocumentType::Visa), &provider, &mut form, &sink)
        .unwrap();
    assert_eq!(outcome, RunOutcome::NoData);
    assert_eq!(form.value(FormField::LastName), "Петров");
    assert_eq!(sink.confirmed.borrow().len(), 1);
}

#[test]
fn sessions_do_not_leak_state_across_runs() {
    let mut r = reconciler();
    let mut form = MemoryForm::new().with_value(FormField::LastName, "Петров");
    let sink = RecordingSink::default();
    let provider = FixtureProvider { fixture: Some("passport_rf.json") };

    r.run(request(DocumentType::PassportRf), &provider, &mut form, &sink)
        .unwrap();
    assert!(!r.conflicts().is_empty());
    r.cancel();

    // Re-run on a different file after cancelling: fresh conflict set
    let mut req = request(DocumentType::PassportRf);
    req.file_id = "file_8".into();
    let outcome = r.run(req, &provider, &mut form, &sink).unwrap();
    assert!(matches!(outcome, RunOutcome::Conflicts { .. }));
    assert_eq!(r.conflicts().len(), 1);
    assert_eq!(r.conflicts()[0].field, FormField::LastName);
}

// -------------------------------------------------------------------------
// Config
// -------------------------------------------------------------------------

#[test]
fn alias_override_loaded_from_file() {
    use std::io::Write as _;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recognizer.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        r#"
[aliases]
last_name = ["familiya"]
"#
    )
    .unwrap();

    let config = EngineConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.aliases.last_name, vec!["familiya"]);

    let mut r = Reconciler::new(config, citizenships());
    let mut form = MemoryForm::new();
    let sink = RecordingSink::default();
    let token = r.start(request(DocumentType::Visa)).unwrap();
    let raw: RawRecognitionResult =
        serde_json::from_str(r#"{"normalized": {"familiya": "Иванов", "lastName": "x"}}"#).unwrap();
    r.complete(token, Ok(raw), &mut form, &sink).unwrap();
    assert_eq!(form.value(FormField::LastName), "Иванов");
}
