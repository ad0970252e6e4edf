//! Request-scoped pipeline context.
//!
//! Replaces session-held globals (the current index, the current
//! credential) with an explicit object owned by the caller and passed
//! into the pipeline operations. The CLI builds one per invocation;
//! tests build one around fakes.

use std::path::PathBuf;
use std::sync::Arc;

use chromatune_index::{IndexMode, SharedIndex};

use crate::catalog::{Catalog, SpotifyClient};
use crate::config::Config;
use crate::describe::{Describer, GeminiDescriber};
use crate::embed::{Embedder, GeminiEmbedder};
use crate::error::PipelineResult;
use crate::gemini::GeminiClient;

/// Everything an ingest or search invocation needs.
#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn Catalog>,
    pub describer: Arc<dyn Describer>,
    pub embedder: Arc<dyn Embedder>,
    /// The active vector index. The ingest pipeline exclusively owns the
    /// write path; search only reads.
    pub index: SharedIndex,
    pub index_mode: IndexMode,
    /// Snapshot file the index is persisted to after a successful ingest.
    /// `None` keeps the index ephemeral (process lifetime only).
    pub index_snapshot: Option<PathBuf>,
    pub registry_path: PathBuf,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("index_mode", &self.index_mode)
            .field("index_snapshot", &self.index_snapshot)
            .field("registry_path", &self.registry_path)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build a context with real clients from configuration, attaching to
    /// an existing index snapshot when one is on disk.
    pub fn from_config(config: &Config) -> PipelineResult<Self> {
        if config.spotify_client_id.is_none() || config.spotify_client_secret.is_none() {
            log::warn!("Spotify credentials not configured; catalog calls will fail to authenticate");
        }
        if config.gemini_api_key.is_none() {
            log::warn!("Gemini API key not configured; generation and embedding will fail");
        }

        let catalog = SpotifyClient::new(
            config.spotify_client_id.clone().unwrap_or_default(),
            config.spotify_client_secret.clone().unwrap_or_default(),
        )?;
        let gemini = GeminiClient::new(config.gemini_api_key.clone().unwrap_or_default())?;

        let index = if config.index_path.exists() {
            let index = SharedIndex::load(&config.index_path)?;
            log::info!(
                "Attached to index snapshot at {} ({} entries)",
                config.index_path.display(),
                index.len()
            );
            index
        } else {
            SharedIndex::new()
        };

        Ok(Self {
            catalog: Arc::new(catalog),
            describer: Arc::new(GeminiDescriber::new(
                gemini.clone(),
                config.text_model.clone(),
                config.vision_model.clone(),
            )),
            embedder: Arc::new(GeminiEmbedder::new(gemini, config.embedding_model.clone())),
            index,
            index_mode: config.index_mode,
            index_snapshot: Some(config.index_path.clone()),
            registry_path: config.registry_path.clone(),
        })
    }
}
