//! Model Types
//!
//! Results, outcomes and errors for the outlier model. No modeling logic here.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::LayoutMismatchError;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("insufficient training data: need at least {required} events, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("no model at {0}")]
    NotFound(PathBuf),

    #[error("model file corrupt: {0}")]
    Corrupt(String),

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("model io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// SCORING RESULTS
// ============================================================================

/// Outlier verdict for one event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub is_anomaly: bool,
    /// Decision function value, higher = more normal, negative = outlier
    pub normality: f64,
    /// 0..=100, non-increasing in normality
    pub anomaly_score: f64,
}

/// Scoring outcome; a missing model is a normal lifecycle state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnomalyOutcome {
    Scored(AnomalyResult),
    Unavailable { reason: String },
}

impl AnomalyOutcome {
    /// Unavailable counts as not anomalous
    pub fn is_anomaly(&self) -> bool {
        match self {
            AnomalyOutcome::Scored(result) => result.is_anomaly,
            AnomalyOutcome::Unavailable { .. } => false,
        }
    }

    /// None when unavailable
    pub fn anomaly_score(&self) -> Option<f64> {
        match self {
            AnomalyOutcome::Scored(result) => Some(result.anomaly_score),
            AnomalyOutcome::Unavailable { .. } => None,
        }
    }

    pub fn result(&self) -> Option<&AnomalyResult> {
        match self {
            AnomalyOutcome::Scored(result) => Some(result),
            AnomalyOutcome::Unavailable { .. } => None,
        }
    }
}

// ============================================================================
// TRAINING
// ============================================================================

/// Returned by a successful retrain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainSummary {
    pub trained_on: usize,
    pub sample_size: usize,
    pub n_trees: usize,
    pub offset: f64,
    /// Training events the fitted model labels as outliers
    pub anomalies_in_training: usize,
    pub model_path: PathBuf,
    pub trained_at: DateTime<Utc>,
}
