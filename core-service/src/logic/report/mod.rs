//! Report Module - Audit Report assembly and hand-off
//!
//! Reports are stored as JSONL with automatic rotation when no external
//! persistence collaborator is wired in.

pub mod types;
pub mod writer;


pub use types::{AuditReport, EvidenceChunkRef, ReviewWorkflow, REVIEW_OWNER, REVIEW_STATUS_PENDING};
pub use writer::{JsonlReportWriter, ReportError, ReportSink};
