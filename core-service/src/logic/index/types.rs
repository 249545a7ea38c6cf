//! Similarity Index - in-memory structure
//!
//! Unit-normalised embedding rows with a parallel chunk list. Rows are
//! append-only; an offset, once assigned, always names the same chunk.

use std::path::PathBuf;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("shape mismatch on {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("index artefact not found: {0}")]
    NotFound(PathBuf),

    #[error("index corrupt: {0}")]
    Corrupt(String),

    #[error("index io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// SEARCH RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Insertion offset inside the index
    pub offset: usize,
    pub chunk: String,
    /// Inner product with the query
    pub similarity: f32,
}

/// One stored row: chunk text and its embedding, at a fixed offset
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk<'a> {
    pub offset: usize,
    pub text: &'a str,
    pub embedding: ArrayView1<'a, f32>,
}

// ============================================================================
// INDEX
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityIndex {
    dimension: usize,
    vectors: Array2<f32>,
    chunks: Vec<String>,
}

impl SimilarityIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Array2::zeros((0, dimension)),
            chunks: Vec::new(),
        }
    }

    /// Rebuild from persisted halves; rows must line up with chunks
    pub fn from_parts(vectors: Array2<f32>, chunks: Vec<String>) -> Result<Self, IndexError> {
        if vectors.nrows() != chunks.len() {
            return Err(IndexError::ShapeMismatch {
                what: "chunk count",
                expected: vectors.nrows(),
                actual: chunks.len(),
            });
        }
        Ok(Self {
            dimension: vectors.ncols(),
            vectors,
            chunks,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunk(&self, offset: usize) -> Option<&str> {
        self.chunks.get(offset).map(String::as_str)
    }

    pub fn entry(&self, offset: usize) -> Option<IndexedChunk<'_>> {
        let text = self.chunks.get(offset)?;
        Some(IndexedChunk {
            offset,
            text,
            embedding: self.vectors.row(offset),
        })
    }

    pub fn vectors(&self) -> ArrayView2<'_, f32> {
        self.vectors.view()
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Append rows. Validation happens before anything is applied.
    pub fn add(&mut self, embeddings: ArrayView2<'_, f32>, chunks: &[String]) -> Result<usize, IndexError> {
        if embeddings.ncols() != self.dimension {
            return Err(IndexError::ShapeMismatch {
                what: "embedding width",
                expected: self.dimension,
                actual: embeddings.ncols(),
            });
        }
        if embeddings.nrows() != chunks.len() {
            return Err(IndexError::ShapeMismatch {
                what: "chunk count",
                expected: embeddings.nrows(),
                actual: chunks.len(),
            });
        }

        self.vectors
            .append(Axis(0), embeddings)
            .map_err(|e| IndexError::Corrupt(format!("append failed: {e}")))?;
        self.chunks.extend(chunks.iter().cloned());

        Ok(chunks.len())
    }

    /// Top-k by inner product, ties by ascending offset. Empty index → empty.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, IndexError> {
        if self.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(IndexError::ShapeMismatch {
                what: "query width",
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let scores = self.vectors.dot(&ArrayView1::from(query));

        let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(top_k);

        Ok(ranked
            .into_iter()
            .map(|(offset, similarity)| SearchHit {
                offset,
                chunk: self.chunks[offset].clone(),
                similarity,
            })
            .collect())
    }

    /// Drop rows past `len`; used to undo an add whose persist failed
    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }
        self.vectors = self.vectors.slice(ndarray::s![..len, ..]).to_owned();
        self.chunks.truncate(len);
    }
}
