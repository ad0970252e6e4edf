use std::path::Path;

use serde::{Deserialize, Serialize};

use chromatune_core::model::SongMetadata;

use crate::error::{IndexError, IndexResult};

/// One persisted unit in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Catalog track id. Entries with an id are replaced on re-upsert;
    /// entries without one are always appended (pure insert, no dedup).
    pub id: Option<String>,
    pub vector: Vec<f32>,
    pub metadata: SongMetadata,
}

/// The in-memory vector store.
///
/// Distance is squared L2, ascending (the metric the original FAISS
/// deployment exposed). Scores are returned raw; normalization is a
/// presentation concern of the caller.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryIndex {
    entries: Vec<IndexEntry>,
}

impl MemoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The resident vector dimension, or `None` when the index is empty.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|e| e.vector.len())
    }

    /// Write or replace entries.
    ///
    /// Entries carrying an id replace any resident entry with the same id;
    /// id-less entries are appended. All vectors must match the resident
    /// dimension.
    pub fn upsert(&mut self, entries: Vec<IndexEntry>) -> IndexResult<()> {
        for entry in entries {
            if entry.vector.is_empty() {
                return Err(IndexError::EmptyVector);
            }
            if let Some(expected) = self.dimension() {
                if entry.vector.len() != expected {
                    return Err(IndexError::DimensionMismatch {
                        expected,
                        actual: entry.vector.len(),
                    });
                }
            }

            // Playlists are small; a linear scan beats maintaining a
            // side table that would have to survive (de)serialization.
            let resident = entry
                .id
                .as_deref()
                .and_then(|id| self.entries.iter().position(|e| e.id.as_deref() == Some(id)));
            match resident {
                Some(pos) => self.entries[pos] = entry,
                None => self.entries.push(entry),
            }
        }
        Ok(())
    }

    /// Return up to `k` entries closest to `vector`, ascending by score.
    ///
    /// Returns fewer than `k` results when the index holds fewer entries;
    /// that is not an error.
    #[must_use]
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<(SongMetadata, f32)> {
        let mut scored: Vec<(SongMetadata, f32)> = self
            .entries
            .iter()
            .map(|entry| (entry.metadata.clone(), squared_l2(&entry.vector, vector)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        scored
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write a snapshot of the index to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> IndexResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(self)?;
        std::fs::write(path, json)?;
        log::debug!("Saved index snapshot ({} entries) to {}", self.len(), path.display());
        Ok(())
    }

    /// Load a snapshot previously written by [`MemoryIndex::save`].
    pub fn load(path: impl AsRef<Path>) -> IndexResult<Self> {
        let json = std::fs::read(path.as_ref())?;
        let index: Self = serde_json::from_slice(&json)?;
        Ok(index)
    }
}

/// Squared L2 distance. Vectors of unequal length compare over the
/// shared prefix; upsert's dimension check keeps that from happening
/// for resident entries.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
