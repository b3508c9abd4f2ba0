//! Reconciliation Session state machine.
//!
//! One session spans a single run: recognize, normalize, build candidates,
//! classify, auto-fill, collect user decisions on conflicts, apply, confirm.
//! At most one run is in flight at a time; completions from cancelled or
//! superseded runs are identified by token and ignored.

use std::collections::BTreeMap;

use crate::candidates::build_candidates;
use crate::citizenship::CitizenshipRef;
use crate::classify::classify;
use crate::config::EngineConfig;
use crate::error::ReconError;
use crate::form::FormAdapter;
use crate::model::{
    ConflictEntry, Decision, DocumentType, FormField, NormalizedOcr, RawRecognitionResult,
    RecognitionRequest, RunOutcome, RunToken, SessionStatus,
};
use crate::normalize::normalize;

/// External recognition provider: turns an uploaded file into a raw payload.
pub trait RecognitionProvider {
    fn recognize(
        &self,
        document_type: DocumentType,
        file_id: &str,
    ) -> Result<RawRecognitionResult, ReconError>;
}

/// External persistence: records that a file was reconciled for an employee
/// using the given provider's normalized output.
pub trait ConfirmSink {
    fn confirm(
        &self,
        employee_id: &str,
        file_id: &str,
        provider: &str,
        normalized: &NormalizedOcr,
    ) -> Result<(), ReconError>;
}

#[derive(Debug)]
struct PendingSession {
    request: RecognitionRequest,
    normalized: NormalizedOcr,
    conflicts: Vec<ConflictEntry>,
}

#[derive(Debug)]
enum State {
    Idle,
    Running {
        token: RunToken,
        request: RecognitionRequest,
    },
    PendingConflicts(PendingSession),
}

/// Drives reconciliation sessions over an injected form adapter.
///
/// The state enum is the single guard against concurrent runs: `start`
/// refuses while a run is active, and `complete` accepts only the token it
/// handed out for the current run.
pub struct Reconciler {
    config: EngineConfig,
    citizenships: Vec<CitizenshipRef>,
    state: State,
    next_token: u64,
}

impl Reconciler {
    pub fn new(config: EngineConfig, citizenships: Vec<CitizenshipRef>) -> Self {
        Self {
            config,
            citizenships,
            state: State::Idle,
            next_token: 1,
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            State::Idle => SessionStatus::Idle,
            State::Running { .. } => SessionStatus::Running,
            State::PendingConflicts(_) => SessionStatus::PendingConflicts,
        }
    }

    /// Begin a recognition run. Refused while another run or an unresolved
    /// conflict set is active for this context.
    pub fn start(&mut self, request: RecognitionRequest) -> Result<RunToken, ReconError> {
        if !matches!(self.state, State::Idle) {
            return Err(ReconError::SessionBusy);
        }
        let token = RunToken(self.next_token);
        self.next_token += 1;
        self.state = State::Running { token, request };
        Ok(token)
    }

    /// Feed the recognizer's response back into the session.
    ///
    /// A token that does not belong to the live run means the run was
    /// cancelled or superseded; the response is dropped (`Stale`) and no
    /// state is touched. Recognition failure resets to idle with nothing
    /// retained. Otherwise the pipeline runs to either an immediate
    /// confirmation or a pending conflict set.
    pub fn complete<F, S>(
        &mut self,
        token: RunToken,
        response: Result<RawRecognitionResult, ReconError>,
        form: &mut F,
        sink: &S,
    ) -> Result<RunOutcome, ReconError>
    where
        F: FormAdapter,
        S: ConfirmSink,
    {
        let live = matches!(&self.state, State::Running { token: t, .. } if *t == token);
        if !live {
            return Ok(RunOutcome::Stale);
        }
        let request = match std::mem::replace(&mut self.state, State::Idle) {
            State::Running { request, .. } => request,
            _ => unreachable!("guarded by the live check above"),
        };

        let raw = match response {
            Ok(raw) => raw,
            Err(ReconError::Recognition(msg)) => return Err(ReconError::Recognition(msg)),
            Err(e) => return Err(ReconError::Recognition(e.to_string())),
        };

        let normalized = normalize(&raw, &self.config.aliases);
        let candidates = build_candidates(
            request.document_type,
            &normalized,
            &self.citizenships,
            &self.config.gender,
        );

        if candidates.is_empty() {
            // Nothing to apply; the file is still reconciled
            self.confirm(sink, &request, &normalized)?;
            return Ok(RunOutcome::NoData);
        }

        let snapshot = form.get(&FormField::ALL);
        let classified = classify(&candidates, &snapshot, &self.config.gender);

        // Auto-fills land in the form before any conflict is surfaced
        if !classified.auto_fill.is_empty() {
            form.set(&classified.auto_fill);
        }

        if classified.conflicts.is_empty() {
            let filled = classified.auto_fill.len();
            self.confirm(sink, &request, &normalized)?;
            return Ok(RunOutcome::AutoFilled { filled });
        }

        let count = classified.conflicts.len();
        self.state = State::PendingConflicts(PendingSession {
            request,
            normalized,
            conflicts: classified.conflicts,
        });
        Ok(RunOutcome::Conflicts { count })
    }

    /// Conflict entries of the pending session, if any.
    pub fn conflicts(&self) -> &[ConflictEntry] {
        match &self.state {
            State::PendingConflicts(s) => &s.conflicts,
            _ => &[],
        }
    }

    /// Toggle the decision on one conflicted field.
    pub fn set_decision(&mut self, field: FormField, decision: Decision) -> Result<(), ReconError> {
        let session = match &mut self.state {
            State::PendingConflicts(s) => s,
            _ => return Err(ReconError::NoActiveSession),
        };
        match session.conflicts.iter_mut().find(|c| c.field == field) {
            Some(entry) => {
                entry.decision = decision;
                Ok(())
            }
            None => Err(ReconError::UnknownConflictField(field.as_str().to_string())),
        }
    }

    /// Apply the pending decisions: `Replace` entries are written to the
    /// form, `Keep` entries are left untouched, then the run is confirmed
    /// with the full normalized result. On confirm failure the session stays
    /// pending with all decisions intact, so the user can retry without
    /// re-resolving.
    pub fn apply<F, S>(&mut self, form: &mut F, sink: &S) -> Result<(), ReconError>
    where
        F: FormAdapter,
        S: ConfirmSink,
    {
        let session = match &self.state {
            State::PendingConflicts(s) => s,
            _ => return Err(ReconError::NoActiveSession),
        };

        let replacements: BTreeMap<FormField, String> = session
            .conflicts
            .iter()
            .filter(|c| c.decision == Decision::Replace)
            .map(|c| (c.field, c.ocr.clone()))
            .collect();
        if !replacements.is_empty() {
            form.set(&replacements);
        }

        sink.confirm(
            &session.request.employee_id,
            &session.request.file_id,
            &session.request.provider,
            &session.normalized,
        )
        .map_err(as_confirm_error)?;

        self.state = State::Idle;
        Ok(())
    }

    /// Discard the session without persistence. Values already auto-filled
    /// stay in the form; they only ever replaced emptiness. Any in-flight
    /// recognition response becomes stale.
    pub fn cancel(&mut self) {
        self.state = State::Idle;
    }

    /// Synchronous convenience path: start, recognize, complete.
    pub fn run<P, F, S>(
        &mut self,
        request: RecognitionRequest,
        provider: &P,
        form: &mut F,
        sink: &S,
    ) -> Result<RunOutcome, ReconError>
    where
        P: RecognitionProvider,
        F: FormAdapter,
        S: ConfirmSink,
    {
        let token = self.start(request.clone())?;
        let response = provider.recognize(request.document_type, &request.file_id);
        self.complete(token, response, form, sink)
    }

    fn confirm<S: ConfirmSink>(
        &self,
        sink: &S,
        request: &RecognitionRequest,
        normalized: &NormalizedOcr,
    ) -> Result<(), ReconError> {
        sink.confirm(
            &request.employee_id,
            &request.file_id,
            &request.provider,
            normalized,
        )
        .map_err(as_confirm_error)
    }
}

fn as_confirm_error(e: ReconError) -> ReconError {
    match e {
        ReconError::Confirm(msg) => ReconError::Confirm(msg),
        other => ReconError::Confirm(other.to_string()),
    }
}
