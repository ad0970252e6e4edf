//! The ingest pipeline.
//!
//! Builds (or extends) the searchable corpus for one playlist:
//! catalog fetch, batched vibe generation, embedding, and incremental
//! index writes, finishing with a registry upsert. Description failures
//! recover per batch with fallback text; embedding and index failures
//! abort the run. The registry is only touched after everything else
//! succeeded.

use chromatune_core::model::{PlaylistRecord, ValidTrack};
use chromatune_core::Registry;
use chromatune_index::{IndexEntry, IndexMode, MemoryIndex};

use crate::context::AppContext;
use crate::error::{PipelineError, PipelineResult};

/// Songs per description-generation call. Bounds prompt size and keeps
/// each call inside the provider's latency/quota envelope.
pub const DESCRIPTION_BATCH_SIZE: usize = 10;

/// Result of a successful ingest.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub playlist: PlaylistRecord,
    /// Number of valid tracks written to the index.
    pub track_count: usize,
}

/// Ingest one playlist into the vector index.
pub async fn ingest(ctx: &AppContext, playlist_id: &str) -> PipelineResult<IngestOutcome> {
    let playlist_id = playlist_id.trim();
    if playlist_id.is_empty() {
        return Err(PipelineError::validation("playlist id must not be empty"));
    }

    let playlist = ctx
        .catalog
        .playlist(playlist_id)
        .await?
        .ok_or(PipelineError::NotFound {
            entity: "playlist",
            id: playlist_id.to_string(),
        })?;

    let tracks = ctx.catalog.playlist_tracks(playlist_id).await?;
    let valid: Vec<ValidTrack> = tracks.into_iter().filter_map(|t| t.into_valid()).collect();
    if valid.is_empty() {
        return Err(PipelineError::NoTracks {
            playlist_id: playlist_id.to_string(),
        });
    }

    log::info!(
        "Ingesting {} ({} valid tracks, {:?} mode)",
        playlist.name,
        valid.len(),
        ctx.index_mode
    );

    // Replace mode builds off to the side and swaps at the end, so
    // readers never observe a half-built index. Accumulate mode writes
    // straight into the live index, batch by batch.
    let mut staging = match ctx.index_mode {
        IndexMode::Replace => Some(MemoryIndex::new()),
        IndexMode::Accumulate => None,
    };

    for (batch_no, batch) in valid.chunks(DESCRIPTION_BATCH_SIZE).enumerate() {
        log::info!("Generating vibes for batch {} ({} songs)", batch_no + 1, batch.len());

        let vibes = match ctx.describer.describe_batch(batch).await {
            Ok(vibes) => vibes,
            Err(e) => {
                log::warn!("Description batch {} failed: {}", batch_no + 1, e);
                Vec::new()
            }
        };

        // Positional zip: result i belongs to track i. Entries the model
        // dropped, mangled, or a failed batch get the per-track fallback;
        // surplus results are ignored.
        let texts: Vec<String> = batch
            .iter()
            .enumerate()
            .map(|(i, track)| {
                vibes
                    .get(i)
                    .and_then(|v| v.vibe.clone())
                    .unwrap_or_else(|| track.fallback_vibe())
            })
            .collect();

        let vectors = ctx.embedder.embed_batch(&texts).await?;
        if vectors.len() != batch.len() {
            return Err(PipelineError::Embedding {
                message: format!(
                    "expected {} vectors for batch {}, got {}",
                    batch.len(),
                    batch_no + 1,
                    vectors.len()
                ),
            });
        }

        let entries: Vec<IndexEntry> = batch
            .iter()
            .zip(vectors)
            .map(|(track, vector)| IndexEntry {
                id: track.id.clone(),
                vector,
                metadata: track.metadata(),
            })
            .collect();

        match staging.as_mut() {
            Some(index) => index.upsert(entries)?,
            None => ctx.index.upsert(entries)?,
        }
    }

    if let Some(index) = staging {
        ctx.index.replace(index);
    }

    if let Some(path) = &ctx.index_snapshot {
        ctx.index.persist(path)?;
    }

    Registry::open(&ctx.registry_path)?.upsert_playlist(&playlist)?;
    log::info!("Ingest complete: {} tracks indexed", valid.len());

    Ok(IngestOutcome {
        playlist,
        track_count: valid.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_context, FakeCatalog, FakeDescriber, FakeEmbedder};
    use chromatune_core::model::Track;
    use std::sync::Arc;

    fn tracks(n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| Track {
                id: Some(format!("t{i}")),
                name: format!("Song {i}"),
                artist: Some(format!("Artist {i}")),
                url: Some(format!("https://example/t{i}")),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_blank_playlist_id_rejected_before_catalog() {
        let catalog = Arc::new(FakeCatalog::with_tracks("p1", tracks(3)));
        let ctx = test_context(catalog.clone(), FakeDescriber::echo(), FakeEmbedder::new());

        let err = ingest(&ctx, "   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(catalog.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_playlist_fails_fast() {
        let ctx = test_context(
            Arc::new(FakeCatalog::not_found()),
            FakeDescriber::echo(),
            FakeEmbedder::new(),
        );
        let err = ingest(&ctx, "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_zero_valid_tracks_is_failure_and_registry_untouched() {
        let invalid = vec![
            Track { id: None, name: "No url".into(), artist: Some("A".into()), url: None },
            Track { id: None, name: "No artist".into(), artist: None, url: Some("u".into()) },
        ];
        let ctx = test_context(
            Arc::new(FakeCatalog::with_tracks("p1", invalid)),
            FakeDescriber::echo(),
            FakeEmbedder::new(),
        );

        let err = ingest(&ctx, "p1").await.unwrap_err();
        assert!(matches!(err, PipelineError::NoTracks { .. }));

        let registry = Registry::open(&ctx.registry_path).unwrap();
        assert!(registry.list_playlists().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_tracks_filtered_not_fatal() {
        let mut all = tracks(3);
        all.push(Track { id: None, name: "Local".into(), artist: None, url: None });
        let ctx = test_context(
            Arc::new(FakeCatalog::with_tracks("p1", all)),
            FakeDescriber::echo(),
            FakeEmbedder::new(),
        );

        let outcome = ingest(&ctx, "p1").await.unwrap();
        assert_eq!(outcome.track_count, 3);
        assert_eq!(ctx.index.len(), 3);
    }

    #[tokio::test]
    async fn test_twelve_tracks_make_two_batches() {
        let describer = FakeDescriber::echo();
        let ctx = test_context(
            Arc::new(FakeCatalog::with_tracks("p1", tracks(12))),
            describer.clone(),
            FakeEmbedder::new(),
        );

        let outcome = ingest(&ctx, "p1").await.unwrap();
        assert_eq!(outcome.track_count, 12);
        assert_eq!(describer.batch_sizes(), vec![10, 2]);
        assert_eq!(ctx.index.len(), 12);
    }

    #[tokio::test]
    async fn test_short_description_batch_falls_back_for_tail() {
        // 7 vibes for a 10-song batch: the remaining 3 get the template.
        let describer = FakeDescriber::truncated(7);
        let embedder = FakeEmbedder::new();
        let ctx = test_context(
            Arc::new(FakeCatalog::with_tracks("p1", tracks(10))),
            describer,
            embedder.clone(),
        );

        let outcome = ingest(&ctx, "p1").await.unwrap();
        assert_eq!(outcome.track_count, 10);

        let texts = embedder.embedded_texts();
        assert_eq!(texts.len(), 10);
        assert!(texts[6].starts_with("vibe for"));
        assert_eq!(texts[7], "Music by Artist 7");
        assert_eq!(texts[9], "Music by Artist 9");
    }

    #[tokio::test]
    async fn test_malformed_item_degrades_only_its_own_position() {
        // Items 1 and 3 come back without a vibe; 0 and 2 keep theirs.
        let describer = FakeDescriber::gappy();
        let embedder = FakeEmbedder::new();
        let ctx = test_context(
            Arc::new(FakeCatalog::with_tracks("p1", tracks(4))),
            describer,
            embedder.clone(),
        );

        let outcome = ingest(&ctx, "p1").await.unwrap();
        assert_eq!(outcome.track_count, 4);
        assert_eq!(
            embedder.embedded_texts(),
            vec![
                "vibe for Song 0",
                "Music by Artist 1",
                "vibe for Song 2",
                "Music by Artist 3"
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_description_batch_falls_back_entirely() {
        let describer = FakeDescriber::failing();
        let embedder = FakeEmbedder::new();
        let ctx = test_context(
            Arc::new(FakeCatalog::with_tracks("p1", tracks(3))),
            describer,
            embedder.clone(),
        );

        let outcome = ingest(&ctx, "p1").await.unwrap();
        assert_eq!(outcome.track_count, 3);
        assert_eq!(
            embedder.embedded_texts(),
            vec!["Music by Artist 0", "Music by Artist 1", "Music by Artist 2"]
        );
    }

    #[tokio::test]
    async fn test_reingest_with_ids_is_idempotent() {
        let ctx = test_context(
            Arc::new(FakeCatalog::with_tracks("p1", tracks(12))),
            FakeDescriber::echo(),
            FakeEmbedder::new(),
        );

        ingest(&ctx, "p1").await.unwrap();
        ingest(&ctx, "p1").await.unwrap();

        assert_eq!(ctx.index.len(), 12);
        let registry = Registry::open(&ctx.registry_path).unwrap();
        assert_eq!(registry.list_playlists().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_accumulate_mode_reingest_also_idempotent() {
        let mut ctx = test_context(
            Arc::new(FakeCatalog::with_tracks("p1", tracks(5))),
            FakeDescriber::echo(),
            FakeEmbedder::new(),
        );
        ctx.index_mode = IndexMode::Accumulate;

        ingest(&ctx, "p1").await.unwrap();
        ingest(&ctx, "p1").await.unwrap();
        assert_eq!(ctx.index.len(), 5);
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts_and_leaves_registry_untouched() {
        let ctx = test_context(
            Arc::new(FakeCatalog::with_tracks("p1", tracks(3))),
            FakeDescriber::echo(),
            FakeEmbedder::failing(),
        );

        let err = ingest(&ctx, "p1").await.unwrap_err();
        assert!(matches!(err, PipelineError::Embedding { .. }));

        let registry = Registry::open(&ctx.registry_path).unwrap();
        assert!(registry.list_playlists().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_successful_ingest_registers_playlist() {
        let ctx = test_context(
            Arc::new(FakeCatalog::with_tracks("p1", tracks(2))),
            FakeDescriber::echo(),
            FakeEmbedder::new(),
        );

        ingest(&ctx, "p1").await.unwrap();

        let registry = Registry::open(&ctx.registry_path).unwrap();
        let record = registry.get_playlist("p1").unwrap().unwrap();
        assert_eq!(record.name, "Playlist p1");
    }

    #[tokio::test]
    async fn test_snapshot_written_when_configured() {
        let ctx = test_context(
            Arc::new(FakeCatalog::with_tracks("p1", tracks(2))),
            FakeDescriber::echo(),
            FakeEmbedder::new(),
        );

        ingest(&ctx, "p1").await.unwrap();

        let path = ctx.index_snapshot.as_ref().unwrap();
        let attached = chromatune_index::SharedIndex::load(path).unwrap();
        assert_eq!(attached.len(), 2);
    }
}
