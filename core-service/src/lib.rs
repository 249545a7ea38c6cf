//! GRC Core - compliance event evaluation library
//!
//! Exposes the evaluation engine for embedding in other hosts. The
//! `grc-core` binary is a thin CLI over the same API.

pub mod constants;
pub mod logic;

pub use logic::config::ServiceConfig;
pub use logic::escalation::{ComplianceEngine, EngineError, Evaluation, EvaluationOutcome};
pub use logic::events::LogEvent;
pub use logic::report::AuditReport;
