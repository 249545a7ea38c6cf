//! Audit Report Types
//!
//! A report is assembled once per escalation (or ad-hoc question) and handed
//! off. Nothing in the core reads it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::rag::{ComplianceStatus, Evidence, GroundingIssue, PipelineResult};
use crate::logic::risk::RiskAssessment;

/// Owner of every new report's review
pub const REVIEW_OWNER: &str = "GRC";

/// Initial review status
pub const REVIEW_STATUS_PENDING: &str = "Needs Review";

/// Traceability entry for a chunk shown to the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceChunkRef {
    pub citation_id: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewWorkflow {
    pub owner: String,
    pub status: String,
    pub reviewer: Option<String>,
    pub review_notes: Option<String>,
}

impl Default for ReviewWorkflow {
    fn default() -> Self {
        Self {
            owner: REVIEW_OWNER.to_string(),
            status: REVIEW_STATUS_PENDING.to_string(),
            reviewer: None,
            review_notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub report_id: Uuid,
    pub generated_at_utc: DateTime<Utc>,
    pub policy_source: String,
    pub question: String,
    pub compliance_status: ComplianceStatus,
    pub confidence: f64,
    pub risk: RiskAssessment,

    pub explanation: Vec<String>,
    pub evidence: Vec<Evidence>,
    pub recommended_mitigation: Vec<String>,
    pub missing_information: Vec<String>,

    pub evidence_chunks: Vec<EvidenceChunkRef>,

    // Diagnostics
    pub raw_generation_text: Option<String>,
    pub extracted_json: Option<String>,
    pub parse_error: Option<String>,
    pub generation_error: Option<String>,
    pub grounding_issues: Vec<GroundingIssue>,

    pub review_workflow: ReviewWorkflow,
}

impl AuditReport {
    pub fn assemble(result: &PipelineResult, policy_source: &str) -> Self {
        let structured = result.structured_output.clone().unwrap_or_default();

        Self {
            report_id: Uuid::new_v4(),
            generated_at_utc: Utc::now(),
            policy_source: if policy_source.trim().is_empty() {
                "unknown".to_string()
            } else {
                policy_source.to_string()
            },
            question: result.question.clone(),
            compliance_status: result.compliance_status(),
            confidence: result.confidence,
            risk: result.risk,
            explanation: structured.explanation,
            evidence: structured.evidence,
            recommended_mitigation: structured.recommended_mitigation,
            missing_information: structured.missing_information,
            evidence_chunks: result
                .retrieved
                .iter()
                .map(|c| EvidenceChunkRef {
                    citation_id: c.citation_id.clone(),
                    similarity: c.similarity,
                })
                .collect(),
            raw_generation_text: result.raw_generation_text.clone(),
            extracted_json: result.extracted_json.clone(),
            parse_error: result.parse_error.clone(),
            generation_error: result.generation_error.clone(),
            grounding_issues: result.grounding_issues.clone(),
            review_workflow: ReviewWorkflow::default(),
        }
    }
}
