//! Index Module - Policy Similarity Search
//!
//! Inner-product nearest-neighbour search over unit-normalised policy chunk
//! embeddings, with crash-safe paired persistence.

pub mod storage;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use storage::{persist, read_manifest, restore, IndexManifest};
pub use store::PolicyStore;
pub use types::{IndexError, IndexedChunk, SearchHit, SimilarityIndex};
