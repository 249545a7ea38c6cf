//! Risk Synthesizer
//!
//! compliance_risk = s × v × f / 125 × 100
//! review_priority = (1 − confidence) × 100
//!
//! The two scores are independent outputs.

use super::types::{RiskAssessment, RiskInputs, RiskLevel, ScoreBand};
use crate::logic::math::{clamp_or_min, round_to};

const MAX_FACTOR_PRODUCT: f64 = 125.0;

fn band(score: f64) -> ScoreBand {
    let score = round_to(clamp_or_min(score, 0.0, 100.0), 2);
    ScoreBand {
        score,
        level: RiskLevel::from_score(score),
    }
}

/// Clamp every input into its declared range
pub fn clamp_inputs(inputs: RiskInputs) -> RiskInputs {
    RiskInputs {
        severity: inputs.severity.clamp(1, 5),
        sensitivity: inputs.sensitivity.clamp(1, 5),
        frequency: inputs.frequency.clamp(1, 5),
        confidence: clamp_or_min(inputs.confidence, 0.0, 1.0),
    }
}

pub fn synthesize(inputs: RiskInputs) -> RiskAssessment {
    let inputs = clamp_inputs(inputs);

    let product = inputs.severity as f64 * inputs.sensitivity as f64 * inputs.frequency as f64;
    let compliance_risk = band(product / MAX_FACTOR_PRODUCT * 100.0);
    let review_priority = band((1.0 - inputs.confidence) * 100.0);

    RiskAssessment {
        compliance_risk,
        review_priority,
        inputs: RiskInputs {
            confidence: round_to(inputs.confidence, 3),
            ..inputs
        },
    }
}
