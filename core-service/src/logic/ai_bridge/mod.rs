//! AI Bridge - external embedding + text-inference capabilities
//!
//! The core only sees the two traits below. `OllamaClient` talks to a local
//! inference server; `HashingEmbedder` is a deterministic offline embedder.

pub mod hashing;
pub mod ollama;

use ndarray::Array2;
use thiserror::Error;

pub use hashing::HashingEmbedder;
pub use ollama::OllamaClient;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding transport error: {0}")]
    Transport(String),
    #[error("embedding service returned HTTP {0}")]
    Status(u16),
    #[error("embedding response undecodable: {0}")]
    Decode(String),
    #[error("embedding shape mismatch: expected {expected} columns, got {actual}")]
    Shape { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation transport error: {0}")]
    Transport(String),
    #[error("generation timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation response undecodable: {0}")]
    Decode(String),
}

// ============================================================================
// CAPABILITIES
// ============================================================================

/// Text → fixed-width vectors. Must be deterministic for a fixed model.
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    /// One row per input text
    fn embed(&self, texts: &[String]) -> Result<Array2<f32>, EmbeddingError>;
}

/// Blocking prompt → completion round-trip
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

// ============================================================================
// HELPERS
// ============================================================================

/// Scale every row to unit length; zero rows stay zero
pub fn normalize_rows(matrix: &mut Array2<f32>) {
    for mut row in matrix.rows_mut() {
        let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|v| v / norm);
        }
    }
}

/// Embed one text and return its unit-length vector
pub fn embed_one(embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>, EmbeddingError> {
    let mut matrix = embedder.embed(&[text.to_string()])?;
    if matrix.ncols() != embedder.dimension() {
        return Err(EmbeddingError::Shape {
            expected: embedder.dimension(),
            actual: matrix.ncols(),
        });
    }
    normalize_rows(&mut matrix);
    matrix
        .rows()
        .into_iter()
        .next()
        .map(|row| row.to_vec())
        .ok_or_else(|| EmbeddingError::Decode("no embedding returned".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_normalize_rows() {
        let mut m = array![[3.0f32, 4.0], [0.0, 0.0]];
        normalize_rows(&mut m);
        assert!((m[[0, 0]] - 0.6).abs() < 1e-6);
        assert!((m[[0, 1]] - 0.8).abs() < 1e-6);
        assert_eq!(m[[1, 0]], 0.0);
    }

    #[test]
    fn test_embed_one_is_unit_length() {
        let embedder = HashingEmbedder::new(32);
        let v = embed_one(&embedder, "minimum necessary access to PHI").unwrap();
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert_eq!(v.len(), 32);
        assert!((norm - 1.0).abs() < 1e-5);
    }
}
