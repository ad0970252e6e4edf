use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod commands;

use commands::ConfigAction;

#[derive(Debug, Parser)]
#[command(name = "chromatune", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the playlist registry (default: ~/.local/share/chromatune/registry.db)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Ingest a Spotify playlist into the vector index
    ///
    /// Fetches every track of the playlist, asks the generative model for a
    /// short vibe description of each song (in batches), embeds the
    /// descriptions, and writes the vectors into the index. On success the
    /// playlist is recorded in the registry and the index snapshot is
    /// rewritten, so later `search` invocations can attach to it directly.
    ///
    /// Tracks without an artist or a canonical link (local files, removed
    /// tracks) are skipped. Songs whose description the model failed to
    /// produce are indexed under a plain "Music by <artist>" fallback
    /// rather than dropped.
    Ingest {
        /// Spotify playlist id (the part after /playlist/ in the URL)
        playlist_id: String,
    },
    /// Search the indexed songs by vibe
    ///
    /// Embeds the query and returns the closest indexed songs, best match
    /// first. The query can be free text, an image, or both; with an image,
    /// the model first describes the image's ambiance and that description
    /// is prepended to the text before embedding.
    Search {
        /// Free-text vibe description
        query: Option<String>,

        /// Path to an image whose ambiance seeds the query
        #[arg(long)]
        image: Option<PathBuf>,

        /// Print results as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List or remove registered playlists
    Playlists {
        /// Remove this playlist id from the registry
        #[arg(long)]
        remove: Option<String>,
    },
    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli.registry {
        Some(path) => chromatune_pipeline::Config::load_with_registry_path(path)?,
        None => chromatune_pipeline::Config::load()?,
    };

    if let Some(parent) = config.registry_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match cli.command {
        Commands::Ingest { playlist_id } => {
            commands::run_ingest(&config, &playlist_id).await?;
        }
        Commands::Search { query, image, json } => {
            commands::run_search(&config, query, image, json).await?;
        }
        Commands::Playlists { remove } => {
            commands::run_playlists(&config, remove)?;
        }
        Commands::Config { action } => {
            commands::run_config(&config, action.unwrap_or(ConfigAction::Show))?;
        }
    }

    Ok(())
}
