//! Ingest and search pipelines for chromatune.
//!
//! Orchestrates the external collaborators (the Spotify catalog, the
//! Gemini generative/embedding capabilities, and the vector index) into
//! the two request-scoped operations: `ingest` builds or extends the
//! searchable corpus for one playlist, `search` ranks that corpus
//! against a text and/or image vibe.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod config;
pub mod context;
pub mod describe;
pub mod embed;
pub mod error;
pub mod gemini;
pub mod ingest;
pub mod resilience;
pub mod search;

#[cfg(test)]
pub(crate) mod testutil;

pub use catalog::{Catalog, SpotifyClient};
pub use config::Config;
pub use context::AppContext;
pub use describe::{Describer, GeminiDescriber, SongVibe};
pub use embed::{Embedder, GeminiEmbedder};
pub use error::{PipelineError, PipelineResult};
pub use gemini::GeminiClient;
pub use ingest::{ingest, IngestOutcome, DESCRIPTION_BATCH_SIZE};
pub use search::{search, ImagePayload, SearchRequest, SearchResponse, SEARCH_TOP_K};
