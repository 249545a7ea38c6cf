//! Sensitivity Detector
//!
//! Compiled taxonomy + detection logic.
//! Input: free text. Output: SensitivityResult. Never fails at scan time.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;

use super::rules::{RulesError, SensitivityRules};
use super::types::{PatternTier, SensitivityResult, KEYWORD_SENSITIVITY, MIN_SENSITIVITY};

struct CompiledPattern {
    category: String,
    regex: Regex,
    tier: PatternTier,
}

/// Pattern/keyword classifier for sensitive-data exposure
pub struct SensitivityDetector {
    patterns: Vec<CompiledPattern>,
    keywords: Vec<String>,
}

impl SensitivityDetector {
    /// Compile a rule set. Invalid regexes are rejected here, not at scan time.
    pub fn new(rules: &SensitivityRules) -> Result<Self, RulesError> {
        let mut seen = HashSet::new();
        let mut patterns = Vec::with_capacity(rules.patterns.len());

        for rule in &rules.patterns {
            if !seen.insert(rule.category.clone()) {
                return Err(RulesError::DuplicateCategory(rule.category.clone()));
            }
            let regex = Regex::new(&rule.pattern).map_err(|source| RulesError::InvalidPattern {
                category: rule.category.clone(),
                source,
            })?;
            patterns.push(CompiledPattern {
                category: rule.category.clone(),
                regex,
                tier: rule.tier,
            });
        }

        let keywords = rules
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        log::debug!(
            "Sensitivity detector compiled: {} patterns, {} keywords",
            patterns.len(),
            rules.keywords.len()
        );

        Ok(Self { patterns, keywords })
    }

    /// Detector with the built-in taxonomy
    pub fn with_default_rules() -> Self {
        Self::new(&SensitivityRules::default())
            .unwrap_or_else(|e| unreachable!("built-in sensitivity rules must compile: {e}"))
    }

    /// Scan one message
    pub fn detect(&self, text: &str) -> SensitivityResult {
        let lowered = text.to_lowercase();

        let mut matches = BTreeMap::new();
        let mut best_tier: Option<PatternTier> = None;

        for pattern in &self.patterns {
            let found: Vec<String> = pattern
                .regex
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect();

            if !found.is_empty() {
                best_tier = match best_tier {
                    Some(PatternTier::Identifier) => Some(PatternTier::Identifier),
                    _ => Some(pattern.tier),
                };
            }
            matches.insert(pattern.category.clone(), found);
        }

        let keyword_hits: Vec<String> = self
            .keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .cloned()
            .collect();

        // Tie-break: identifier > any pattern > keyword only > nothing
        let sensitivity = match best_tier {
            Some(tier) => tier.sensitivity(),
            None if !keyword_hits.is_empty() => KEYWORD_SENSITIVITY,
            None => MIN_SENSITIVITY,
        };

        SensitivityResult {
            has_sensitive_data: best_tier.is_some() || !keyword_hits.is_empty(),
            sensitivity,
            matches,
            keyword_hits,
        }
    }
}

impl Default for SensitivityDetector {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

// ============================================================================
// TESTS
// ============================================================================
