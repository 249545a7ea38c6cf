//! Risk Types

use serde::{Deserialize, Serialize};

/// Banded level shared by both risk scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// ≥75 Critical, ≥50 High, ≥25 Medium, else Low
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            RiskLevel::Critical
        } else if score >= 50.0 {
            RiskLevel::High
        } else if score >= 25.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskInputs {
    /// 1..=5
    pub severity: u8,
    /// 1..=5
    pub sensitivity: u8,
    /// 1..=5
    pub frequency: u8,
    /// 0..=1
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    /// 0..=100, 2 decimals
    pub score: f64,
    pub level: RiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Inherent risk of the practice
    pub compliance_risk: ScoreBand,
    /// Urgency of human review; driven by confidence only
    pub review_priority: ScoreBand,
    /// Inputs after clamping
    pub inputs: RiskInputs,
}
