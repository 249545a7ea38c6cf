//! Sensitivity Rules
//!
//! The detection taxonomy as data: category -> pattern, plus a keyword list.
//! No detection logic here. Extend the taxonomy by editing a rules file,
//! not the detector.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::PatternTier;

// ============================================================================
// DEFAULT TAXONOMY
// ============================================================================

const EMAIL_PATTERN: &str = r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b";
const PHONE_PATTERN: &str = r"\b(?:\+1[-.\s]?)?(?:\(\d{3}\)|\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b";
const SSN_PATTERN: &str = r"\b\d{3}-\d{2}-\d{4}\b";
// Deliberately broad: any d/m/y-looking triple
const DOB_PATTERN: &str = r"\b(?:\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b";
const MRN_PATTERN: &str = r"(?i)\bMRN[:\s-]*\d{5,12}\b";

/// Keywords that often correlate with PHI contexts
const DEFAULT_KEYWORDS: &[&str] = &[
    "patient",
    "diagnosis",
    "treatment",
    "lab",
    "prescription",
    "rx",
    "insurance",
    "medical record",
    "mrn",
    "ssn",
    "dob",
    "address",
];

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("invalid pattern for category '{category}': {source}")]
    InvalidPattern {
        category: String,
        #[source]
        source: regex::Error,
    },
    #[error("duplicate pattern category '{0}'")]
    DuplicateCategory(String),
    #[error("rules io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("rules serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// RULE SET
// ============================================================================

/// One structural matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Key in `SensitivityResult::matches`
    pub category: String,
    /// Regular expression (regex crate syntax)
    pub pattern: String,
    /// Sensitivity tier when this pattern matches
    pub tier: PatternTier,
}

impl PatternRule {
    pub fn new(category: &str, pattern: &str, tier: PatternTier) -> Self {
        Self {
            category: category.to_string(),
            pattern: pattern.to_string(),
            tier,
        }
    }
}

/// Full taxonomy handed to the detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRules {
    pub patterns: Vec<PatternRule>,
    pub keywords: Vec<String>,
}

impl Default for SensitivityRules {
    fn default() -> Self {
        Self {
            patterns: vec![
                PatternRule::new("email", EMAIL_PATTERN, PatternTier::Structural),
                PatternRule::new("phone", PHONE_PATTERN, PatternTier::Structural),
                PatternRule::new("ssn", SSN_PATTERN, PatternTier::Identifier),
                PatternRule::new("dob", DOB_PATTERN, PatternTier::Structural),
                PatternRule::new("mrn", MRN_PATTERN, PatternTier::Identifier),
            ],
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl SensitivityRules {
    /// Load a rule set from a JSON file
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let data = fs::read(path)?;
        let rules: SensitivityRules = serde_json::from_slice(&data)?;
        Ok(rules)
    }

    /// Save a rule set as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), RulesError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Add or replace a pattern category
    pub fn with_pattern(mut self, rule: PatternRule) -> Self {
        self.patterns.retain(|p| p.category != rule.category);
        self.patterns.push(rule);
        self
    }

    /// Add a keyword (stored lower-cased)
    pub fn with_keyword(mut self, keyword: &str) -> Self {
        let keyword = keyword.to_lowercase();
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }
}
