//! `anketa-recon`: OCR-to-form reconciliation engine.
//!
//! Pure engine crate: receives raw recognizer payloads and an injected form
//! adapter, merges recognized values into a partially-filled employee form
//! without overwriting user-entered data, and surfaces true conflicts for
//! human arbitration. No UI, HTTP, or storage dependencies.

pub mod candidates;
pub mod citizenship;
pub mod classify;
pub mod compare;
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod normalize;
pub mod session;

pub use citizenship::CitizenshipRef;
pub use config::EngineConfig;
pub use error::ReconError;
pub use form::{FormAdapter, MemoryForm};
pub use model::{
    ClassifyOutput, ConflictEntry, Decision, DocumentType, FormField, NormalizedOcr,
    RawRecognitionResult, RecognitionRequest, RunOutcome, RunToken, SessionStatus,
};
pub use session::{ConfirmSink, RecognitionProvider, Reconciler};
