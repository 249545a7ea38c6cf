//! Feature Vector - model input
//!
//! `EventFeatures` is the named record; `FeatureVector` is the fixed-order
//! numeric form the outlier model accepts.

use serde::{Deserialize, Serialize};

use super::layout::{layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_VERSION};

/// Numeric features derived from one log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFeatures {
    /// 0..=23
    pub hour: u32,
    pub message_length: usize,
    /// 0 or 1
    pub has_sensitive_data: u8,
    /// 1..=5
    pub sensitivity: u8,
}

impl EventFeatures {
    /// Fixed-order vector in FEATURE_LAYOUT order
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector::from_values([
            self.hour as f64,
            self.message_length as f64,
            self.has_sensitive_data as f64,
            self.sensitivity as f64,
        ])
    }
}

/// Versioned feature vector with layout metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub version: u8,
    pub layout_hash: u32,
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }
}

impl From<&EventFeatures> for FeatureVector {
    fn from(features: &EventFeatures) -> Self {
        features.to_vector()
    }
}
