//! Index Storage - paired persistence of vectors + chunks
//!
//! Layout of an index directory:
//!   policy.<gen>.index.json    embedding matrix
//!   policy_chunks.<gen>.json   chunk texts
//!   MANIFEST.json              generation, shape, SHA-256 of both halves
//!
//! Both halves of a generation are written before the manifest is swapped
//! in by rename. The manifest names the only authoritative generation;
//! halves from any other generation are leftovers and get pruned.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::types::{IndexError, SimilarityIndex};

pub const MANIFEST_FILE: &str = "MANIFEST.json";

const INDEX_PREFIX: &str = "policy.";
const INDEX_SUFFIX: &str = ".index.json";
const CHUNKS_PREFIX: &str = "policy_chunks.";
const CHUNKS_SUFFIX: &str = ".json";

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub generation: u64,
    pub dimension: usize,
    pub rows: usize,
    pub index_file: String,
    pub chunks_file: String,
    pub index_sha256: String,
    pub chunks_sha256: String,
    pub written_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct VectorHalf {
    dimension: usize,
    vectors: Array2<f32>,
}

// ============================================================================
// HELPERS
// ============================================================================

fn index_file_name(generation: u64) -> String {
    format!("{INDEX_PREFIX}{generation}{INDEX_SUFFIX}")
}

fn chunks_file_name(generation: u64) -> String {
    format!("{CHUNKS_PREFIX}{generation}{CHUNKS_SUFFIX}")
}

/// Generation encoded in a half's file name, if it is one
fn generation_of(name: &str) -> Option<u64> {
    if let Some(rest) = name.strip_prefix(CHUNKS_PREFIX) {
        return rest.strip_suffix(CHUNKS_SUFFIX)?.parse().ok();
    }
    name.strip_prefix(INDEX_PREFIX)?
        .strip_suffix(INDEX_SUFFIX)?
        .parse()
        .ok()
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), IndexError> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

fn read_half(path: &Path) -> Result<Vec<u8>, IndexError> {
    if !path.exists() {
        return Err(IndexError::NotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE)
}

/// Read the manifest; NotFound when absent, Corrupt when undecodable
pub fn read_manifest(dir: &Path) -> Result<IndexManifest, IndexError> {
    let path = manifest_path(dir);
    if !path.exists() {
        return Err(IndexError::NotFound(path));
    }
    let data = fs::read(&path)?;
    serde_json::from_slice(&data).map_err(|e| IndexError::Corrupt(format!("manifest: {e}")))
}

// ============================================================================
// PERSIST / RESTORE
// ============================================================================

/// Write a new generation and make it authoritative
pub fn persist(index: &SimilarityIndex, dir: &Path) -> Result<IndexManifest, IndexError> {
    fs::create_dir_all(dir)?;

    let generation = match read_manifest(dir) {
        Ok(manifest) => manifest.generation + 1,
        Err(IndexError::NotFound(_)) => 1,
        Err(e) => {
            log::warn!("Replacing unreadable index manifest: {}", e);
            1
        }
    };

    let half = VectorHalf {
        dimension: index.dimension(),
        vectors: index.vectors().to_owned(),
    };
    let index_bytes = serde_json::to_vec(&half)?;
    let chunks_bytes = serde_json::to_vec(index.chunks())?;

    let manifest = IndexManifest {
        generation,
        dimension: index.dimension(),
        rows: index.len(),
        index_file: index_file_name(generation),
        chunks_file: chunks_file_name(generation),
        index_sha256: sha256_hex(&index_bytes),
        chunks_sha256: sha256_hex(&chunks_bytes),
        written_at: Utc::now(),
    };

    write_synced(&dir.join(&manifest.index_file), &index_bytes)?;
    write_synced(&dir.join(&manifest.chunks_file), &chunks_bytes)?;

    let tmp = dir.join(format!("{MANIFEST_FILE}.{}.tmp", Uuid::new_v4().simple()));
    write_synced(&tmp, &serde_json::to_vec_pretty(&manifest)?)?;
    fs::rename(&tmp, manifest_path(dir))?;

    prune_generations(dir, generation);

    log::info!(
        "Index persisted: generation {} ({} rows, dim {})",
        generation,
        manifest.rows,
        manifest.dimension
    );
    Ok(manifest)
}

/// Load the generation the manifest names, verifying both halves
pub fn restore(dir: &Path) -> Result<SimilarityIndex, IndexError> {
    let manifest = read_manifest(dir)?;

    let index_bytes = read_half(&dir.join(&manifest.index_file))?;
    let chunks_bytes = read_half(&dir.join(&manifest.chunks_file))?;

    if sha256_hex(&index_bytes) != manifest.index_sha256 {
        return Err(IndexError::Corrupt(format!("{} checksum mismatch", manifest.index_file)));
    }
    if sha256_hex(&chunks_bytes) != manifest.chunks_sha256 {
        return Err(IndexError::Corrupt(format!("{} checksum mismatch", manifest.chunks_file)));
    }

    let half: VectorHalf = serde_json::from_slice(&index_bytes)
        .map_err(|e| IndexError::Corrupt(format!("{}: {e}", manifest.index_file)))?;
    let chunks: Vec<String> = serde_json::from_slice(&chunks_bytes)
        .map_err(|e| IndexError::Corrupt(format!("{}: {e}", manifest.chunks_file)))?;

    if half.vectors.nrows() != chunks.len() || chunks.len() != manifest.rows {
        return Err(IndexError::Corrupt(format!(
            "length mismatch: {} vectors, {} chunks, manifest says {}",
            half.vectors.nrows(),
            chunks.len(),
            manifest.rows
        )));
    }
    if half.vectors.ncols() != manifest.dimension || half.dimension != manifest.dimension {
        return Err(IndexError::Corrupt(format!(
            "dimension mismatch: vectors {}, manifest {}",
            half.vectors.ncols(),
            manifest.dimension
        )));
    }

    let index = SimilarityIndex::from_parts(half.vectors, chunks)?;
    log::info!(
        "Index restored: generation {} ({} rows)",
        manifest.generation,
        index.len()
    );
    Ok(index)
}

/// Remove halves that do not belong to `keep`
fn prune_generations(dir: &Path, keep: u64) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("Skip pruning {:?}: {}", dir, e);
            return;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        match generation_of(name) {
            Some(generation) if generation != keep => {
                if let Err(e) = fs::remove_file(entry.path()) {
                    log::debug!("Failed to prune {}: {}", name, e);
                }
            }
            _ => {}
        }
    }
}
