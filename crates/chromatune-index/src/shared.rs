use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chromatune_core::model::SongMetadata;

use crate::error::IndexResult;
use crate::memory::{IndexEntry, MemoryIndex};

/// Cloneable handle to the process's active index.
///
/// A replace-mode ingest builds its index off to the side and installs it
/// with [`SharedIndex::replace`]; readers see either the old index or the
/// new one, never a half-built state.
#[derive(Debug, Clone, Default)]
pub struct SharedIndex {
    inner: Arc<RwLock<MemoryIndex>>,
}

impl SharedIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_index(index: MemoryIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    /// Attach to a snapshot on disk.
    pub fn load(path: impl AsRef<Path>) -> IndexResult<Self> {
        Ok(Self::from_index(MemoryIndex::load(path)?))
    }

    pub fn upsert(&self, entries: Vec<IndexEntry>) -> IndexResult<()> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .upsert(entries)
    }

    #[must_use]
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<(SongMetadata, f32)> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .query(vector, k)
    }

    pub fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Swap in a fully built index.
    pub fn replace(&self, index: MemoryIndex) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = index;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the current contents to a snapshot file.
    pub fn persist(&self, path: impl AsRef<Path>) -> IndexResult<()> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .save(path)
    }
}
