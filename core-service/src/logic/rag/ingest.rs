//! Policy ingestion: chunk, embed, normalise, add + persist

use super::types::PipelineError;
use crate::logic::ai_bridge::{normalize_rows, Embedder, EmbeddingError};
use crate::logic::index::PolicyStore;

pub const DEFAULT_CHUNK_SIZE: usize = 1200;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Fixed-size char windows over whitespace-collapsed text
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if chunk_size == 0 {
        return Vec::new();
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<char> = collapsed.chars().collect();
    let step = chunk_size.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Returns the number of chunks added
pub fn ingest_policy_text(text: &str, embedder: &dyn Embedder, store: &PolicyStore) -> Result<usize, PipelineError> {
    let chunks = chunk_text(text, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP);
    if chunks.is_empty() {
        log::warn!("Policy text produced no chunks, nothing ingested");
        return Ok(0);
    }

    let mut embeddings = embedder.embed(&chunks)?;
    if embeddings.nrows() != chunks.len() {
        return Err(EmbeddingError::Decode(format!(
            "expected {} embeddings, got {}",
            chunks.len(),
            embeddings.nrows()
        ))
        .into());
    }
    normalize_rows(&mut embeddings);

    let added = store.add_and_persist(embeddings.view(), &chunks)?;
    log::info!("Ingested {} policy chunks (index now {} rows)", added, store.len());
    Ok(added)
}
