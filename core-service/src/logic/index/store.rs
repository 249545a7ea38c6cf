//! Policy Store - the shared, lock-guarded index instance
//!
//! One instance per process, constructed at startup and passed by reference.
//! Writers (add + persist) hold the write lock for the whole unit.

use std::path::{Path, PathBuf};

use ndarray::ArrayView2;
use parking_lot::RwLock;

use super::storage::{manifest_path, persist, restore};
use super::types::{IndexError, SearchHit, SimilarityIndex};

pub struct PolicyStore {
    dir: PathBuf,
    index: RwLock<SimilarityIndex>,
}

impl PolicyStore {
    /// Empty store rooted at `dir` (nothing written until the first add)
    pub fn empty(dir: impl Into<PathBuf>, dimension: usize) -> Self {
        Self {
            dir: dir.into(),
            index: RwLock::new(SimilarityIndex::new(dimension)),
        }
    }

    /// Restore the persisted index; fails if missing or corrupt
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, IndexError> {
        let dir = dir.into();
        let index = restore(&dir)?;
        Ok(Self {
            dir,
            index: RwLock::new(index),
        })
    }

    /// Restore if a manifest exists, else start empty. A corrupt index is an error.
    pub fn open_or_empty(dir: impl Into<PathBuf>, dimension: usize) -> Result<Self, IndexError> {
        let dir = dir.into();
        if !manifest_path(&dir).exists() {
            log::info!("No policy index at {:?}, starting empty", dir);
            return Ok(Self::empty(dir, dimension));
        }

        let store = Self::open(dir)?;
        let stored = store.dimension();
        if stored != dimension {
            return Err(IndexError::ShapeMismatch {
                what: "stored index dimension",
                expected: dimension,
                actual: stored,
            });
        }
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn dimension(&self) -> usize {
        self.index.read().dimension()
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, IndexError> {
        self.index.read().search(query, top_k)
    }

    /// Add and persist as one unit. If persisting fails the add is undone,
    /// so memory keeps matching the last successful persist.
    pub fn add_and_persist(&self, embeddings: ArrayView2<'_, f32>, chunks: &[String]) -> Result<usize, IndexError> {
        let mut index = self.index.write();
        let before = index.len();

        let added = index.add(embeddings, chunks)?;
        if let Err(e) = persist(&index, &self.dir) {
            log::warn!("Index persist failed, rolling back {} rows: {}", added, e);
            index.truncate(before);
            return Err(e);
        }

        Ok(added)
    }

    /// Write the current state as a new generation. Takes the write lock so
    /// it serialises with `add_and_persist`.
    pub fn persist(&self) -> Result<(), IndexError> {
        let index = self.index.write();
        persist(&index, &self.dir).map(|_| ())
    }
}
