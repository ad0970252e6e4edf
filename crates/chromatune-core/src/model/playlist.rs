use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A playlist that has been ingested into the vector index.
///
/// Owned by the registry; upserted by id after a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    /// Catalog-assigned playlist identifier.
    pub id: String,
    pub name: String,
    /// Canonical external link to the playlist.
    pub url: String,
    /// Cover image URL, when the catalog provides one.
    pub image: Option<String>,
    /// When the playlist was last successfully ingested.
    pub ingested_at: DateTime<Utc>,
}

impl PlaylistRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            image: None,
            ingested_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}
