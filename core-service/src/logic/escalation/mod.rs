//! Escalation Module - event triage state machine
//!
//! Triaged: sensitivity and outlier checks ran, nothing else to do.
//! Escalated: sensitive data or an outlier was found, so a compliance
//! question went through the RAG pipeline and an audit report was built.

pub mod orchestrator;
pub mod stats;
pub mod types;


pub use orchestrator::{escalation_question, ComplianceEngine, ESCALATION_PREAMBLE};
pub use stats::{CounterSnapshot, EvaluationCounters};
pub use types::{EngineError, Evaluation, EvaluationOutcome};
