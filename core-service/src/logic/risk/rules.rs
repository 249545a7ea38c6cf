//! Risk Keyword Rules
//!
//! Keyword lists used to infer risk inputs from a question. Data, not
//! branches: load a different set to change the inference.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::RiskInputs;

#[derive(Debug, Error)]
pub enum RiskRulesError {
    #[error("risk rules io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("risk rules serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskKeywordRules {
    /// Any hit → sensitivity 5
    pub regulated_data_terms: Vec<String>,
    /// Any hit → severity 4
    pub logging_terms: Vec<String>,
    /// Hit together with a logging term and a stored-data term → severity 5
    pub storage_terms: Vec<String>,
    /// Data terms that escalate severity when stored
    pub stored_data_terms: Vec<String>,
    pub base_sensitivity: u8,
    pub high_sensitivity: u8,
    pub base_severity: u8,
    pub logging_severity: u8,
    pub storage_severity: u8,
    /// Fixed until usage telemetry exists
    pub frequency: u8,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for RiskKeywordRules {
    fn default() -> Self {
        Self {
            regulated_data_terms: strings(&["phi", "protected health information", "hipaa"]),
            logging_terms: strings(&["log"]),
            storage_terms: strings(&["store"]),
            stored_data_terms: strings(&["phi", "protected health information"]),
            base_sensitivity: 3,
            high_sensitivity: 5,
            base_severity: 3,
            logging_severity: 4,
            storage_severity: 5,
            frequency: 3,
        }
    }
}

fn mentions(text: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| text.contains(&t.to_lowercase()))
}

impl RiskKeywordRules {
    /// Load from JSON; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, RiskRulesError> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Keyword inference over the lower-cased question
    pub fn infer(&self, question: &str, confidence: f64) -> RiskInputs {
        let q = question.to_lowercase();

        let sensitivity = if mentions(&q, &self.regulated_data_terms) {
            self.high_sensitivity
        } else {
            self.base_sensitivity
        };

        let mut severity = self.base_severity;
        if mentions(&q, &self.logging_terms) {
            severity = self.logging_severity;
            if mentions(&q, &self.storage_terms) && mentions(&q, &self.stored_data_terms) {
                severity = self.storage_severity;
            }
        }

        RiskInputs {
            severity,
            sensitivity,
            frequency: self.frequency,
            confidence,
        }
    }
}
