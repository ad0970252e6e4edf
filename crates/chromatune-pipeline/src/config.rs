use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use chromatune_index::IndexMode;

/// Configuration for chromatune.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (CHROMA_* prefix)
/// 3. Config file (~/.config/chromatune/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Spotify application client id (client-credentials grant).
    ///
    /// Can be set via:
    /// - ENV: CHROMA_SPOTIFY_CLIENT_ID
    /// - Config: spotify_client_id = "..."
    pub spotify_client_id: Option<String>,

    /// Spotify application client secret.
    pub spotify_client_secret: Option<String>,

    /// Gemini API key, used for descriptions, vision, and embeddings.
    ///
    /// Can be set via:
    /// - ENV: CHROMA_GEMINI_API_KEY
    /// - Config: gemini_api_key = "..."
    pub gemini_api_key: Option<String>,

    /// Model used for per-song vibe descriptions.
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for image vibe descriptions.
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Model used for text embeddings.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Path to the playlist registry database.
    ///
    /// Default: ~/.local/share/chromatune/registry.db
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,

    /// Path of the vector index snapshot. A search-only invocation
    /// attaches to this file instead of re-ingesting.
    ///
    /// Default: ~/.local/share/chromatune/index.json
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Write semantics for an ingest run: "replace" builds a fresh index
    /// and swaps it in; "accumulate" upserts into the existing one.
    #[serde(default)]
    pub index_mode: IndexMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spotify_client_id: None,
            spotify_client_secret: None,
            gemini_api_key: None,
            text_model: default_text_model(),
            vision_model: default_vision_model(),
            embedding_model: default_embedding_model(),
            registry_path: default_registry_path(),
            index_path: default_index_path(),
            index_mode: IndexMode::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/chromatune/config.toml
    /// Reads environment variables with CHROMA_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("chroma");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with a custom registry path.
    ///
    /// This is used when the --registry CLI flag is provided.
    pub fn load_with_registry_path(registry_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.registry_path = registry_path;
        Ok(config)
    }
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_vision_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

/// Get the default registry path.
///
/// Returns: ~/.local/share/chromatune/registry.db (or platform equivalent)
fn default_registry_path() -> PathBuf {
    data_dir().join("registry.db")
}

/// Get the default index snapshot path.
fn default_index_path() -> PathBuf {
    data_dir().join("index.json")
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chromatune")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/chromatune/config.toml
/// - macOS: ~/Library/Application Support/chromatune/config.toml
/// - Windows: %APPDATA%\chromatune\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chromatune")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Chromatune Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (CHROMA_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Spotify application credentials (client-credentials grant)
#
# Register an application at: https://developer.spotify.com/dashboard
#
# Can also be set via:
# - Environment: CHROMA_SPOTIFY_CLIENT_ID / CHROMA_SPOTIFY_CLIENT_SECRET
spotify_client_id = "your-spotify-client-id"
spotify_client_secret = "your-spotify-client-secret"

# Gemini API key, used for vibe descriptions, image analysis, and
# text embeddings
#
# Create a key at: https://aistudio.google.com/apikey
#
# Can also be set via:
# - Environment: CHROMA_GEMINI_API_KEY
gemini_api_key = "your-gemini-api-key"

# Models (defaults shown)
#text_model = "gemini-2.5-flash"
#vision_model = "gemini-2.5-flash"
#embedding_model = "text-embedding-004"

# Path to the playlist registry database
#
# Can also be set via:
# - CLI: chromatune --registry /custom/path.db ingest <id>
# - Environment: CHROMA_REGISTRY_PATH=/custom/path.db
#registry_path = "/path/to/registry.db"

# Path of the vector index snapshot; searches attach to this file
#index_path = "/path/to/index.json"

# Ingest write semantics: "replace" (default) or "accumulate"
#index_mode = "replace"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.spotify_client_id.is_none());
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.text_model, "gemini-2.5-flash");
        assert_eq!(config.embedding_model, "text-embedding-004");
        assert_eq!(config.index_mode, IndexMode::Replace);
        assert!(!config.registry_path.as_os_str().is_empty());
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_registry_path() {
        let custom_path = PathBuf::from("/tmp/test-registry.db");
        let config = Config::load_with_registry_path(custom_path.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().registry_path, custom_path);
    }

    #[test]
    fn test_index_mode_deserializes_lowercase() {
        let config: Config =
            serde_json::from_str(r#"{"index_mode": "accumulate"}"#).unwrap();
        assert_eq!(config.index_mode, IndexMode::Accumulate);
    }
}
