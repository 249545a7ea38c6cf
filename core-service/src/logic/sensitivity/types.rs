//! Sensitivity Types
//!
//! Data structures only, no detection logic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lowest sensitivity (nothing found)
pub const MIN_SENSITIVITY: u8 = 1;

/// Highest sensitivity (direct identifier found)
pub const MAX_SENSITIVITY: u8 = 5;

/// Sensitivity when only a keyword hit
pub const KEYWORD_SENSITIVITY: u8 = 3;

/// Sensitivity when a structural pattern matched
pub const STRUCTURAL_SENSITIVITY: u8 = 4;

// ============================================================================
// PATTERN TIER
// ============================================================================

/// How much a pattern match raises sensitivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternTier {
    /// Government-id-like or record-number-like: a direct identifier
    Identifier,
    /// Email, phone, date-of-birth-like: identifying in context
    Structural,
}

impl PatternTier {
    pub fn sensitivity(&self) -> u8 {
        match self {
            PatternTier::Identifier => MAX_SENSITIVITY,
            PatternTier::Structural => STRUCTURAL_SENSITIVITY,
        }
    }
}

// ============================================================================
// SENSITIVITY RESULT
// ============================================================================

/// Outcome of scanning one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    /// Any pattern matched or any keyword hit
    pub has_sensitive_data: bool,
    /// 1..=5
    pub sensitivity: u8,
    /// Category -> matched substrings (every configured category present)
    pub matches: BTreeMap<String, Vec<String>>,
    /// Keywords found in the lower-cased text
    pub keyword_hits: Vec<String>,
}

impl Default for SensitivityResult {
    fn default() -> Self {
        Self {
            has_sensitive_data: false,
            sensitivity: MIN_SENSITIVITY,
            matches: BTreeMap::new(),
            keyword_hits: vec![],
        }
    }
}

impl SensitivityResult {
    /// Number of structural matches across all categories
    pub fn match_count(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }

    /// Categories with at least one match
    pub fn matched_categories(&self) -> Vec<&str> {
        self.matches
            .iter()
            .filter(|(_, found)| !found.is_empty())
            .map(|(category, _)| category.as_str())
            .collect()
    }
}
