//! Spotify catalog client.
//!
//! Fetches playlist metadata and paginated track listings. Credentials
//! use the client-credentials grant; the bearer token is cached for the
//! lifetime of the process. A failed credential exchange is an
//! authentication error (nothing can be fetched without a token), so it
//! is never mistaken for a missing playlist.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use chromatune_core::model::{PlaylistRecord, Track};

use crate::error::{PipelineError, PipelineResult};

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// The music catalog as the pipelines see it.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Playlist metadata, or `None` when the playlist does not exist or
    /// is restricted. Credential failure is an `Auth` error.
    async fn playlist(&self, id: &str) -> PipelineResult<Option<PlaylistRecord>>;

    /// All tracks of a playlist. Follows pagination until exhausted; a
    /// failing page terminates early and returns what was accumulated.
    /// Credential failure is an `Auth` error.
    async fn playlist_tracks(&self, id: &str) -> PipelineResult<Vec<Track>>;
}

// ---------------------------------------------------------------------------
// API response types (private -- the Web API nests track data deeply)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylist {
    id: String,
    name: String,
    external_urls: ExternalUrls,
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct TracksPage {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl From<ApiTrack> for Track {
    fn from(track: ApiTrack) -> Self {
        Self {
            id: track.id,
            name: track.name,
            artist: track.artists.into_iter().next().map(|a| a.name),
            url: track.external_urls.spotify,
        }
    }
}

/// Spotify Web API client.
#[derive(Debug)]
pub struct SpotifyClient {
    http: Client,
    client_id: String,
    client_secret: String,
    api_base: String,
    accounts_base: String,
    token: Mutex<Option<String>>,
}

impl SpotifyClient {
    /// Create a new Spotify client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("chromatune/0.1.0 (https://github.com/chromatune/chromatune)")
            .build()?;

        Ok(Self {
            http,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_base: SPOTIFY_API_BASE.to_string(),
            accounts_base: SPOTIFY_ACCOUNTS_BASE.to_string(),
            token: Mutex::new(None),
        })
    }

    /// Override the API and accounts base URLs (for tests).
    #[must_use]
    pub fn with_base_urls(
        mut self,
        api_base: impl Into<String>,
        accounts_base: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.accounts_base = accounts_base.into();
        self
    }

    /// The cached bearer token, exchanging credentials on first use.
    async fn access_token(&self) -> PipelineResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let url = format!("{}/api/token", self.accounts_base);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::Auth {
                message: format!("token exchange failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(PipelineError::Auth {
                message: format!(
                    "token exchange rejected: HTTP {}; check the Spotify client id and secret",
                    response.status()
                ),
            });
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| PipelineError::Auth {
                message: format!("unparseable token response: {e}"),
            })?
            .access_token;

        *cached = Some(token.clone());
        Ok(token)
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn playlist(&self, id: &str) -> PipelineResult<Option<PlaylistRecord>> {
        let token = self.access_token().await?;

        let url = format!("{}/playlists/{}", self.api_base, id);
        let response = self.http.get(&url).bearer_auth(&token).send().await?;

        if !response.status().is_success() {
            log::warn!("Spotify playlist {} lookup: HTTP {}", id, response.status());
            return Ok(None);
        }

        let playlist = response.json::<ApiPlaylist>().await?;
        let url = playlist
            .external_urls
            .spotify
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", playlist.id));

        let mut record = PlaylistRecord::new(playlist.id, playlist.name, url);
        if let Some(image) = playlist.images.into_iter().next() {
            record = record.with_image(image.url);
        }
        Ok(Some(record))
    }

    async fn playlist_tracks(&self, id: &str) -> PipelineResult<Vec<Track>> {
        let token = self.access_token().await?;

        let mut tracks = Vec::new();
        let mut next = Some(format!("{}/playlists/{}/tracks", self.api_base, id));

        log::info!("Fetching tracks for playlist {}", id);
        while let Some(url) = next.take() {
            let response = match self.http.get(&url).bearer_auth(&token).send().await {
                Ok(res) if res.status().is_success() => res,
                Ok(res) => {
                    // Partial results are acceptable; stop paginating.
                    log::warn!("Track page for {} failed: HTTP {}", id, res.status());
                    break;
                }
                Err(e) => {
                    log::warn!("Track page for {} failed: {}", id, e);
                    break;
                }
            };

            let page = match response.json::<TracksPage>().await {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Track page for {} unparseable: {}", id, e);
                    break;
                }
            };

            tracks.extend(
                page.items
                    .into_iter()
                    .filter_map(|item| item.track)
                    .map(Track::from),
            );
            next = page.next;
        }

        log::info!("Fetched {} tracks for playlist {}", tracks.len(), id);
        Ok(tracks)
    }
}
