//! Anomaly Scorer - model lifecycle around the isolation forest
//!
//! Holds the on-disk location and a lazily loaded in-memory copy.
//! Retraining replaces the file first, then swaps the in-memory model.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::forest::{ForestParams, IsolationForest};
use super::storage::{load_model, save_model, StoredModel};
use super::types::{AnomalyOutcome, ModelError, TrainSummary};
use crate::logic::features::{EventFeatures, FeatureVector};

pub struct AnomalyScorer {
    model_path: PathBuf,
    min_training_events: usize,
    params: ForestParams,
    model: RwLock<Option<Arc<IsolationForest>>>,
    /// Held across fit, save and swap so disk and memory move together
    train_lock: Mutex<()>,
}

impl AnomalyScorer {
    pub fn new(model_path: impl Into<PathBuf>, min_training_events: usize) -> Self {
        Self {
            model_path: model_path.into(),
            min_training_events,
            params: ForestParams::default(),
            model: RwLock::new(None),
            train_lock: Mutex::new(()),
        }
    }

    pub fn with_params(mut self, params: ForestParams) -> Self {
        self.params = params;
        self
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn min_training_events(&self) -> usize {
        self.min_training_events
    }

    /// Fit, persist, then swap. Below the minimum corpus nothing is touched.
    pub fn train(&self, events: &[EventFeatures]) -> Result<TrainSummary, ModelError> {
        if events.len() < self.min_training_events {
            log::warn!(
                "Retrain refused: {} events, need {}",
                events.len(),
                self.min_training_events
            );
            return Err(ModelError::InsufficientData {
                required: self.min_training_events,
                available: events.len(),
            });
        }

        let _training = self.train_lock.lock();

        let vectors: Vec<FeatureVector> = events.iter().map(EventFeatures::to_vector).collect();
        let forest = IsolationForest::fit(&vectors, self.params)?;
        let anomalies_in_training = vectors.iter().filter(|v| forest.score(v).is_anomaly).count();

        let stored = StoredModel::new(forest, events.len());
        save_model(&stored, &self.model_path)?;

        let summary = TrainSummary {
            trained_on: stored.trained_on,
            sample_size: stored.forest.sample_size,
            n_trees: stored.forest.n_trees(),
            offset: stored.forest.offset,
            anomalies_in_training,
            model_path: self.model_path.clone(),
            trained_at: stored.trained_at,
        };

        *self.model.write() = Some(Arc::new(stored.forest));

        log::info!(
            "Anomaly model retrained on {} events ({} flagged)",
            summary.trained_on,
            summary.anomalies_in_training
        );
        Ok(summary)
    }

    /// Score one event; Unavailable when no model has been trained
    pub fn score(&self, features: &EventFeatures) -> AnomalyOutcome {
        match self.current_model() {
            Some(forest) => AnomalyOutcome::Scored(forest.score(&features.to_vector())),
            None => {
                log::info!("Anomaly model unavailable, skipping outlier check");
                AnomalyOutcome::Unavailable {
                    reason: "no trained anomaly model".to_string(),
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.current_model().is_some()
    }

    fn current_model(&self) -> Option<Arc<IsolationForest>> {
        if let Some(model) = self.model.read().as_ref() {
            return Some(Arc::clone(model));
        }

        let mut slot = self.model.write();
        if let Some(model) = slot.as_ref() {
            return Some(Arc::clone(model));
        }

        match load_model(&self.model_path) {
            Ok(stored) => {
                log::info!(
                    "Anomaly model loaded from {:?} (trained on {} events)",
                    self.model_path,
                    stored.trained_on
                );
                let model = Arc::new(stored.forest);
                *slot = Some(Arc::clone(&model));
                Some(model)
            }
            Err(ModelError::NotFound(_)) => None,
            Err(e) => {
                log::warn!("Stored anomaly model unusable: {}", e);
                None
            }
        }
    }
}
