//! Service configuration
//!
//! Built once at process start and handed to the services that need it.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants;

/// Runtime configuration for the compliance core
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Root of all on-disk state
    pub data_dir: PathBuf,

    /// Text-inference / embedding server
    pub ollama_url: String,

    /// Generation model name
    pub generation_model: String,

    /// Embedding model name
    pub embed_model: String,

    /// Embedding width, also the similarity index dimension
    pub embed_dimension: usize,

    /// Blocking generation timeout
    pub generation_timeout: Duration,

    /// Chunks handed to the generator per question
    pub top_k: usize,

    /// Minimum corpus size for outlier model training
    pub min_training_events: usize,

    /// Policy label stamped on audit reports
    pub policy_source: String,

    /// Optional JSON rule set for the sensitivity detector
    pub sensitivity_rules_path: Option<PathBuf>,

    /// Optional JSON keyword set for risk inference
    pub risk_rules_path: Option<PathBuf>,
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let data_dir = constants::get_data_dir()
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Self {
            data_dir,
            ollama_url: constants::get_ollama_url(),
            generation_model: constants::get_generation_model(),
            embed_model: constants::get_embed_model(),
            embed_dimension: constants::get_embed_dimension(),
            generation_timeout: Duration::from_secs(constants::get_generation_timeout()),
            top_k: constants::get_top_k(),
            min_training_events: constants::get_min_training_events(),
            policy_source: constants::get_policy_source(),
            sensitivity_rules_path: constants::get_sensitivity_rules_path().map(PathBuf::from),
            risk_rules_path: constants::get_risk_rules_path().map(PathBuf::from),
        }
    }

    /// Same defaults, rooted at an explicit directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::from_env()
        }
    }

    /// Where the outlier model blob lives
    pub fn model_path(&self) -> PathBuf {
        self.data_dir.join("models").join("iforest.json")
    }

    /// Directory holding the index + chunk pair and its manifest
    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("index")
    }

    /// Directory for the JSONL audit report log
    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }
}

/// Get default data path
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(constants::APP_NAME)
}
