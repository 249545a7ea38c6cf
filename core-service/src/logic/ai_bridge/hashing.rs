//! Hashing Embedder - deterministic bag-of-tokens embedding
//!
//! Each lower-cased alphanumeric token is hashed with SHA-256 into a signed
//! bucket. No model, no network. Used offline and in tests.

use std::collections::HashMap;

use ndarray::Array2;
use sha2::{Digest, Sha256};

use super::{Embedder, EmbeddingError};

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_text(&self, text: &str, out: &mut [f32]) {
        if self.dimension == 0 {
            return;
        }

        let mut counts: HashMap<String, u32> = HashMap::new();
        for token in tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }

        for (token, count) in counts {
            let digest = Sha256::digest(token.as_bytes());
            let bucket =
                u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize % self.dimension;
            let sign = if digest[4] % 2 == 0 { 1.0 } else { -1.0 };
            out[bucket] += sign * count as f32;
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[String]) -> Result<Array2<f32>, EmbeddingError> {
        let mut matrix = Array2::<f32>::zeros((texts.len(), self.dimension));
        for (mut row, text) in matrix.rows_mut().into_iter().zip(texts) {
            if let Some(slice) = row.as_slice_mut() {
                self.embed_text(text, slice);
            }
        }
        Ok(matrix)
    }
}
