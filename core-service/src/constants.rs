//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden from the environment (or a `.env` file
//! loaded by the host binary).

/// Default text-inference / embedding server (local Ollama)
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default generation model
pub const DEFAULT_GENERATION_MODEL: &str = "phi3";

/// Default embedding model (384-dim sentence embeddings)
pub const DEFAULT_EMBED_MODEL: &str = "all-minilm";

/// Embedding width produced by the default embedding model
pub const DEFAULT_EMBED_DIMENSION: usize = 384;

/// Blocking generation timeout (seconds). Local models are slow.
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;

/// Number of policy chunks handed to the generator
pub const DEFAULT_TOP_K: usize = 5;

/// Minimum historical events before the outlier model may be trained
pub const DEFAULT_MIN_TRAINING_EVENTS: usize = 30;

/// How many trailing events a retrain reads by default
pub const DEFAULT_RETRAIN_LIMIT: usize = 500;

/// Policy document name recorded on audit reports
pub const DEFAULT_POLICY_SOURCE: &str = "privacysummary.pdf";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "grc-core";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get inference server URL from environment or use default
pub fn get_ollama_url() -> String {
    std::env::var("OLLAMA_URL")
        .unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string())
}

/// Get generation model name from environment or use default
pub fn get_generation_model() -> String {
    std::env::var("OLLAMA_MODEL")
        .unwrap_or_else(|_| DEFAULT_GENERATION_MODEL.to_string())
}

/// Get embedding model name from environment or use default
pub fn get_embed_model() -> String {
    std::env::var("EMBED_MODEL")
        .unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string())
}

/// Get embedding dimension from environment or use default
pub fn get_embed_dimension() -> usize {
    std::env::var("EMBED_DIMENSION")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|d| *d > 0)
        .unwrap_or(DEFAULT_EMBED_DIMENSION)
}

/// Get generation timeout from environment or use default
pub fn get_generation_timeout() -> u64 {
    std::env::var("GENERATION_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS)
}

/// Get retrieval depth from environment or use default
pub fn get_top_k() -> usize {
    std::env::var("RAG_TOP_K")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|k| *k > 0)
        .unwrap_or(DEFAULT_TOP_K)
}

/// Get minimum training corpus size from environment or use default
pub fn get_min_training_events() -> usize {
    std::env::var("MIN_TRAINING_EVENTS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MIN_TRAINING_EVENTS)
}

/// Get policy source label from environment or use default
pub fn get_policy_source() -> String {
    std::env::var("POLICY_SOURCE")
        .unwrap_or_else(|_| DEFAULT_POLICY_SOURCE.to_string())
}

/// Optional path to a JSON sensitivity rule set
pub fn get_sensitivity_rules_path() -> Option<String> {
    std::env::var("SENSITIVITY_RULES_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Optional path to a JSON risk keyword rule set
pub fn get_risk_rules_path() -> Option<String> {
    std::env::var("RISK_RULES_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Data directory override
pub fn get_data_dir() -> Option<String> {
    std::env::var("GRC_DATA_DIR")
        .ok()
        .filter(|s| !s.trim().is_empty())
}
