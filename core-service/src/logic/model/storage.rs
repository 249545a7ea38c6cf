//! Model Storage
//!
//! Saves / loads the fitted forest as versioned JSON.
//! Writes go to a temp file in the same directory and are renamed into
//! place, so readers see either the old model or the new one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::forest::IsolationForest;
use super::types::ModelError;
use crate::logic::features::layout::{layout_hash, validate_layout, FEATURE_VERSION};

/// On-disk envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredModel {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub trained_at: DateTime<Utc>,
    pub trained_on: usize,
    pub forest: IsolationForest,
}

impl StoredModel {
    pub fn new(forest: IsolationForest, trained_on: usize) -> Self {
        Self {
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            trained_at: Utc::now(),
            trained_on,
            forest,
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    path.with_file_name(name)
}

/// Atomically replace the model at `path`
pub fn save_model(model: &StoredModel, path: &Path) -> Result<(), ModelError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec(model)?;
    let tmp = temp_path(path);
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&json)?;
        file.sync_all()?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    log::info!("Model saved to {:?} ({} bytes)", path, json.len());
    Ok(())
}

/// Load and validate the model at `path`
pub fn load_model(path: &Path) -> Result<StoredModel, ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.to_path_buf()));
    }

    let data = fs::read(path)?;
    let model: StoredModel =
        serde_json::from_slice(&data).map_err(|e| ModelError::Corrupt(e.to_string()))?;

    validate_layout(model.feature_version, model.layout_hash)?;

    Ok(model)
}
