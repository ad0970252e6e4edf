use anyhow::Result;
use chromatune_core::model::PlaylistRecord;
use chromatune_core::Registry;
use chromatune_pipeline::Config;

pub fn run_playlists(config: &Config, remove: Option<String>) -> Result<()> {
    let registry = Registry::open(&config.registry_path)?;

    if let Some(id) = remove {
        if registry.remove_playlist(&id)? {
            println!("✓ Removed playlist {id}");
        } else {
            println!("Playlist {id} is not registered");
        }
        return Ok(());
    }

    let playlists = registry.list_playlists()?;
    if playlists.is_empty() {
        println!("No playlists ingested yet. Run 'chromatune ingest <playlist-id>' first.");
        return Ok(());
    }

    println!("Ingested playlists ({}):\n", playlists.len());
    for playlist in playlists {
        print!("{}", format_playlist(&playlist));
    }
    Ok(())
}

fn format_playlist(playlist: &PlaylistRecord) -> String {
    let mut out = format!("  {}  {}\n      {}\n", playlist.id, playlist.name, playlist.url);
    if let Some(image) = &playlist.image {
        out.push_str(&format!("      cover: {image}\n"));
    }
    out.push_str(&format!(
        "      ingested {}\n",
        playlist.ingested_at.format("%Y-%m-%d %H:%M UTC")
    ));
    out
}
