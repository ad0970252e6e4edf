use std::path::PathBuf;

use anyhow::{Context, Result};
use chromatune_pipeline::{search, AppContext, Config, ImagePayload, SearchRequest};

pub async fn run_search(
    config: &Config,
    query: Option<String>,
    image: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let ctx = AppContext::from_config(config)?;

    let image = match image {
        Some(path) => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            log::info!("Loaded image {} ({} bytes)", path.display(), bytes.len());
            Some(ImagePayload::from_bytes(bytes)?)
        }
        None => None,
    };

    let response = search(&ctx, SearchRequest { text: query, image }).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Matches for: {}\n", response.query_text);
    for (rank, song) in response.songs.iter().enumerate() {
        println!("{}. {} by {}", rank + 1, song.name, song.artist);
        println!("   {}  (distance {:.4})", song.url, song.score);
    }
    Ok(())
}
