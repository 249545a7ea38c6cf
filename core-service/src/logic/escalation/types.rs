//! Escalation Types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::events::LogEvent;
use crate::logic::features::EventFeatures;
use crate::logic::index::IndexError;
use crate::logic::model::AnomalyOutcome;
use crate::logic::rag::PipelineError;
use crate::logic::report::{AuditReport, ReportError};
use crate::logic::risk::RiskRulesError;
use crate::logic::sensitivity::{RulesError, SensitivityResult};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("report hand-off failed: {0}")]
    Report(#[from] ReportError),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    RiskRules(#[from] RiskRulesError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Terminal state of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    /// Checked, nothing further to do
    Triaged { reason: String },
    /// Full reasoning pipeline ran
    Escalated {
        question: String,
        report: Box<AuditReport>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub event: LogEvent,
    pub sensitivity: SensitivityResult,
    pub features: EventFeatures,
    pub anomaly: AnomalyOutcome,
    pub outcome: EvaluationOutcome,
}

impl Evaluation {
    pub fn escalated(&self) -> bool {
        matches!(self.outcome, EvaluationOutcome::Escalated { .. })
    }

    pub fn report(&self) -> Option<&AuditReport> {
        match &self.outcome {
            EvaluationOutcome::Escalated { report, .. } => Some(report),
            EvaluationOutcome::Triaged { .. } => None,
        }
    }
}
