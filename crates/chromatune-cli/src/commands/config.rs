use anyhow::Result;
use chromatune_pipeline::config::{config_file_path, ensure_config_file, example_config};
use chromatune_pipeline::Config;

#[derive(Debug, clap::Subcommand)]
pub enum ConfigAction {
    /// Show the current effective configuration
    Show,
    /// Show the config file path
    Path,
    /// Print an example configuration
    Example,
    /// Create the config file with defaults if it does not exist
    Init,
}

pub fn run_config(config: &Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(config),
        ConfigAction::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
        ConfigAction::Example => {
            print!("{}", example_config());
            Ok(())
        }
        ConfigAction::Init => init_config(),
    }
}

fn show_config(config: &Config) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config_file_path().display());

    let exists = config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    println!("  spotify_client_id: {}", redacted(config.spotify_client_id.as_deref()));
    println!("  spotify_client_secret: {}", redacted(config.spotify_client_secret.as_deref()));
    println!("  gemini_api_key: {}", redacted(config.gemini_api_key.as_deref()));
    println!("  text_model: {}", config.text_model);
    println!("  vision_model: {}", config.vision_model);
    println!("  embedding_model: {}", config.embedding_model);
    println!("  registry_path: {}", config.registry_path.display());
    println!("  index_path: {}", config.index_path.display());
    println!("  index_mode: {:?}", config.index_mode);

    println!("\nPriority: CLI args > ENV vars (CHROMA_*) > Config file > Defaults");

    Ok(())
}

fn init_config() -> Result<()> {
    let created = ensure_config_file()?;
    let config_path = config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to add your Spotify and Gemini credentials.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

fn redacted(value: Option<&str>) -> &'static str {
    match value {
        Some(_) => "<set>",
        None => "<not set>",
    }
}
