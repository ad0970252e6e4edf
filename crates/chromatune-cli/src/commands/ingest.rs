use anyhow::Result;
use chromatune_pipeline::{ingest, AppContext, Config};

pub async fn run_ingest(config: &Config, playlist_id: &str) -> Result<()> {
    log::info!("Using registry at {}", config.registry_path.display());
    let ctx = AppContext::from_config(config)?;

    println!("Ingesting playlist {playlist_id}...");
    let outcome = ingest(&ctx, playlist_id).await?;

    println!("\n✓ Ingested \"{}\"", outcome.playlist.name);
    println!("  {} songs indexed", outcome.track_count);
    println!("  {}", outcome.playlist.url);
    Ok(())
}
