//! Risk Module - inherent risk + review urgency scoring

pub mod rules;
pub mod synthesizer;
pub mod types;

pub use rules::{RiskKeywordRules, RiskRulesError};
pub use synthesizer::synthesize;
pub use types::{RiskAssessment, RiskInputs, RiskLevel, ScoreBand};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hipaa_log_question_scenario() {
        let inputs = RiskKeywordRules::default()
            .infer("Is it HIPAA compliant to write patient names to the application log?", 0.9);
        assert_eq!(
            inputs,
            RiskInputs { severity: 4, sensitivity: 5, frequency: 3, confidence: 0.9 }
        );

        let risk = synthesize(inputs);
        assert_eq!(risk.compliance_risk.score, 48.0);
        assert_eq!(risk.compliance_risk.level, RiskLevel::Medium);
        assert_eq!(risk.review_priority.score, 10.0);
        assert_eq!(risk.review_priority.level, RiskLevel::Low);
    }

    #[test]
    fn test_storing_phi_in_logs_escalates_severity() {
        let inputs = RiskKeywordRules::default().infer("Can we store PHI in audit logs?", 0.5);
        assert_eq!(inputs.severity, 5);
        assert_eq!(inputs.sensitivity, 5);

        let risk = synthesize(inputs);
        assert_eq!(risk.compliance_risk.score, 60.0);
        assert_eq!(risk.compliance_risk.level, RiskLevel::High);
    }

    #[test]
    fn test_plain_question_uses_base_inputs() {
        let inputs = RiskKeywordRules::default().infer("Who approves vendor contracts?", 0.2);
        assert_eq!((inputs.severity, inputs.sensitivity, inputs.frequency), (3, 3, 3));
        // Storage without a logging mention does not escalate
        let stored = RiskKeywordRules::default().infer("Where do we store PHI?", 0.2);
        assert_eq!(stored.severity, 3);
        assert_eq!(stored.sensitivity, 5);
    }

    #[test]
    fn test_scores_bounded_and_independent() {
        let max = synthesize(RiskInputs { severity: 5, sensitivity: 5, frequency: 5, confidence: 1.0 });
        assert_eq!(max.compliance_risk.score, 100.0);
        assert_eq!(max.compliance_risk.level, RiskLevel::Critical);
        assert_eq!(max.review_priority.score, 0.0);

        let min = synthesize(RiskInputs { severity: 1, sensitivity: 1, frequency: 1, confidence: 0.0 });
        assert_eq!(min.compliance_risk.score, 0.8);
        assert_eq!(min.compliance_risk.level, RiskLevel::Low);
        assert_eq!(min.review_priority.score, 100.0);
        assert_eq!(min.review_priority.level, RiskLevel::Critical);
    }

    #[test]
    fn test_out_of_range_inputs_clamped() {
        let risk = synthesize(RiskInputs { severity: 9, sensitivity: 0, frequency: 7, confidence: 3.5 });
        assert_eq!(risk.inputs.severity, 5);
        assert_eq!(risk.inputs.sensitivity, 1);
        assert_eq!(risk.inputs.frequency, 5);
        assert_eq!(risk.inputs.confidence, 1.0);
        assert_eq!(risk.compliance_risk.score, 20.0);

        let nan = synthesize(RiskInputs { severity: 3, sensitivity: 3, frequency: 3, confidence: f64::NAN });
        assert_eq!(nan.review_priority.score, 100.0);
    }

    #[test]
    fn test_review_priority_non_increasing_in_confidence() {
        let mut previous = f64::MAX;
        for step in 0..=100 {
            let risk = synthesize(RiskInputs {
                severity: 3,
                sensitivity: 3,
                frequency: 3,
                confidence: step as f64 / 100.0,
            });
            assert!((0.0..=100.0).contains(&risk.review_priority.score));
            assert!(risk.review_priority.score <= previous);
            previous = risk.review_priority.score;
        }
    }

    #[test]
    fn test_rules_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("risk_rules.json");
        std::fs::write(&path, br#"{"frequency": 5, "logging_terms": ["audit trail"]}"#).unwrap();

        let rules = RiskKeywordRules::load(&path).unwrap();
        assert_eq!(rules.frequency, 5);
        assert_eq!(rules.base_severity, RiskKeywordRules::default().base_severity);

        let inputs = rules.infer("Does the audit trail keep PHI?", 0.5);
        assert_eq!((inputs.severity, inputs.sensitivity, inputs.frequency), (4, 5, 5));
        assert_eq!(rules.infer("Is the log retained?", 0.5).severity, 3);
    }

    #[test]
    fn test_rules_file_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RiskKeywordRules::load(&dir.path().join("missing.json")),
            Err(RiskRulesError::Io(_))
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, b"{\"frequency\": ").unwrap();
        assert!(matches!(RiskKeywordRules::load(&path), Err(RiskRulesError::Serialization(_))));
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(RiskLevel::from_score(24.99), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(25.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(50.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(75.0), RiskLevel::Critical);
    }
}
