//! RAG Module - grounded compliance answers over the policy index
//!
//! ## Flow
//! question → embed → search → de-duplicate → prompt → generate →
//! parse → grounding check → confidence + risk

pub mod grounding;
pub mod ingest;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use ingest::{chunk_text, ingest_policy_text};
pub use parse::{parse_answer, ParseError, ParsedAnswer};
pub use pipeline::{compute_confidence, dedupe_candidates, RagPipeline};
pub use prompt::NO_CONTEXT_FOUND;
pub use types::{
    ComplianceStatus, Evidence, GroundingIssue, PipelineError, PipelineResult, RetrievedChunk, StructuredAnswer,
};
