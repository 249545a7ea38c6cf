//! RAG Types
//!
//! Data structures only, no retrieval or generation logic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::ai_bridge::EmbeddingError;
use crate::logic::index::IndexError;
use crate::logic::risk::RiskAssessment;

// ============================================================================
// ERRORS
// ============================================================================

/// Failures that abort a query. Generation and parse failures do not;
/// they are reported on the result.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

// ============================================================================
// STRUCTURED ANSWER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ComplianceStatus {
    Compliant,
    #[serde(rename = "Non-compliant")]
    NonCompliant,
    #[default]
    Unknown,
}

impl ComplianceStatus {
    /// Lenient read of a model-provided status; anything unrecognised is Unknown
    pub fn parse_lenient(value: &str) -> Self {
        let normalized: String = value
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match normalized.as_str() {
            "compliant" => ComplianceStatus::Compliant,
            "noncompliant" => ComplianceStatus::NonCompliant,
            _ => ComplianceStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "Compliant",
            ComplianceStatus::NonCompliant => "Non-compliant",
            ComplianceStatus::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub quote: String,
    /// "C<i>"
    pub citation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StructuredAnswer {
    pub compliance_status: ComplianceStatus,
    pub explanation: Vec<String>,
    pub evidence: Vec<Evidence>,
    pub recommended_mitigation: Vec<String>,
    pub missing_information: Vec<String>,
}

// ============================================================================
// RETRIEVAL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// 1-based rank among the kept chunks, "C1".."Ck"
    pub citation_id: String,
    pub text: String,
    pub similarity: f32,
}

/// Why an evidence item or section failed the grounding check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroundingIssue {
    /// Citation does not name a retrieved chunk; evidence removed
    UnknownCitation { citation: String, quote: String },
    /// Quote is not a substring of the cited chunk; evidence removed
    QuoteNotFound { citation: String, quote: String },
    /// Citation tag used outside the evidence section
    CitationOutsideEvidence { section: String, text: String },
}

// ============================================================================
// PIPELINE RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub question: String,
    pub top_k: usize,
    /// Mean similarity of the top 3 kept chunks, 0..=1
    pub confidence: f64,
    pub risk: RiskAssessment,
    pub retrieved: Vec<RetrievedChunk>,
    pub raw_generation_text: Option<String>,
    pub extracted_json: Option<String>,
    pub structured_output: Option<StructuredAnswer>,
    pub parse_error: Option<String>,
    pub generation_error: Option<String>,
    pub grounding_issues: Vec<GroundingIssue>,
}

impl PipelineResult {
    pub fn compliance_status(&self) -> ComplianceStatus {
        self.structured_output
            .as_ref()
            .map(|s| s.compliance_status)
            .unwrap_or_default()
    }

    pub fn citation_ids(&self) -> Vec<&str> {
        self.retrieved.iter().map(|c| c.citation_id.as_str()).collect()
    }
}
