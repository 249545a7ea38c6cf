//! Model Module - Outlier Detection Engine
//!
//! Isolation forest over event features, its storage, and the scorer
//! service that owns the model lifecycle.

pub mod forest;
pub mod scorer;
pub mod storage;
pub mod types;


pub use forest::{ForestParams, IsolationForest};
pub use scorer::AnomalyScorer;
pub use storage::{load_model, save_model, StoredModel};
pub use types::{AnomalyOutcome, AnomalyResult, ModelError, TrainSummary};
