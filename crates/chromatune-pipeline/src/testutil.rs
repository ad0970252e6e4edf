//! Shared fakes for pipeline tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use chromatune_core::model::{PlaylistRecord, Track, ValidTrack};
use chromatune_index::{IndexMode, SharedIndex};

use crate::catalog::Catalog;
use crate::context::AppContext;
use crate::describe::{Describer, SongVibe};
use crate::embed::Embedder;
use crate::error::{PipelineError, PipelineResult};
use crate::search::ImagePayload;

/// Build a context around fakes, with registry and snapshot paths in a
/// fresh scratch directory.
pub fn test_context(
    catalog: Arc<dyn Catalog>,
    describer: FakeDescriber,
    embedder: FakeEmbedder,
) -> AppContext {
    let dir = tempfile::tempdir().unwrap();
    let root: PathBuf = dir.path().to_path_buf();
    // Keep the scratch directory for the life of the test process.
    std::mem::forget(dir);

    AppContext {
        catalog,
        describer: Arc::new(describer),
        embedder: Arc::new(embedder),
        index: SharedIndex::new(),
        index_mode: IndexMode::Replace,
        index_snapshot: Some(root.join("index.json")),
        registry_path: root.join("registry.db"),
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FakeCatalog {
    playlist_id: Option<String>,
    tracks: Vec<Track>,
    calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn with_tracks(playlist_id: &str, tracks: Vec<Track>) -> Self {
        Self {
            playlist_id: Some(playlist_id.to_string()),
            tracks,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn playlist(&self, id: &str) -> PipelineResult<Option<PlaylistRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .playlist_id
            .as_deref()
            .filter(|known| *known == id)
            .map(|id| PlaylistRecord::new(id, format!("Playlist {id}"), format!("https://example/{id}"))))
    }

    async fn playlist_tracks(&self, id: &str) -> PipelineResult<Vec<Track>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.playlist_id.as_deref() == Some(id) {
            Ok(self.tracks.clone())
        } else {
            Ok(Vec::new())
        }
    }
}

// ---------------------------------------------------------------------------
// Describer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DescriberBehavior {
    Echo,
    Truncated(usize),
    /// Echo, but odd positions come back without a vibe.
    Gappy,
    Failing,
    VisionFailing,
}

#[derive(Debug, Clone)]
pub struct FakeDescriber {
    behavior: DescriberBehavior,
    batch_sizes: Arc<Mutex<Vec<usize>>>,
    vision_calls: Arc<AtomicUsize>,
}

impl FakeDescriber {
    fn with_behavior(behavior: DescriberBehavior) -> Self {
        Self {
            behavior,
            batch_sizes: Arc::new(Mutex::new(Vec::new())),
            vision_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// One vibe per song, `"vibe for {name}"`.
    pub fn echo() -> Self {
        Self::with_behavior(DescriberBehavior::Echo)
    }

    /// Echo, but only the first `n` results come back.
    pub fn truncated(n: usize) -> Self {
        Self::with_behavior(DescriberBehavior::Truncated(n))
    }

    /// Echo, but every odd position comes back without a vibe.
    pub fn gappy() -> Self {
        Self::with_behavior(DescriberBehavior::Gappy)
    }

    /// Every batch fails with a generation error.
    pub fn failing() -> Self {
        Self::with_behavior(DescriberBehavior::Failing)
    }

    /// Batches succeed; image description fails.
    pub fn vision_failing() -> Self {
        Self::with_behavior(DescriberBehavior::VisionFailing)
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn vision_calls(&self) -> usize {
        self.vision_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Describer for FakeDescriber {
    async fn describe_batch(&self, songs: &[ValidTrack]) -> PipelineResult<Vec<SongVibe>> {
        self.batch_sizes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(songs.len());

        let mut vibes: Vec<SongVibe> = songs
            .iter()
            .map(|s| SongVibe {
                title: Some(s.name.clone()),
                vibe: Some(format!("vibe for {}", s.name)),
            })
            .collect();

        match self.behavior {
            DescriberBehavior::Echo | DescriberBehavior::VisionFailing => Ok(vibes),
            DescriberBehavior::Truncated(n) => {
                vibes.truncate(n);
                Ok(vibes)
            }
            DescriberBehavior::Gappy => {
                for (i, vibe) in vibes.iter_mut().enumerate() {
                    if i % 2 == 1 {
                        vibe.vibe = None;
                    }
                }
                Ok(vibes)
            }
            DescriberBehavior::Failing => Err(PipelineError::Generation {
                message: "fake generation failure".to_string(),
            }),
        }
    }

    async fn describe_image(&self, _image: &ImagePayload) -> PipelineResult<String> {
        self.vision_calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            DescriberBehavior::VisionFailing => Err(PipelineError::Vision {
                message: "fake vision failure".to_string(),
            }),
            _ => Ok("sunlit rooftop at golden hour".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Embedder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FakeEmbedder {
    failing: bool,
    texts: Arc<Mutex<Vec<String>>>,
    calls: Arc<AtomicUsize>,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self {
            failing: false,
            texts: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Every text embedded so far, in embedding order.
    pub fn embedded_texts(&self) -> Vec<String> {
        self.texts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The deterministic vector this fake produces for `text`.
    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut acc = [0.0f32; 4];
        for (i, byte) in text.bytes().enumerate() {
            acc[i % 4] += f32::from(byte) / 255.0;
        }
        acc.to_vec()
    }
}

impl Default for FakeEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> PipelineResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(PipelineError::Embedding {
                message: "fake embedding failure".to_string(),
            });
        }
        self.texts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
        Ok(Self::vector_for(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> PipelineResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(PipelineError::Embedding {
                message: "fake embedding failure".to_string(),
            });
        }
        self.texts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(texts.iter().cloned());
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }
}
