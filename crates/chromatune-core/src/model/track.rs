use serde::{Deserialize, Serialize};

use crate::model::SongMetadata;

/// One song as returned by the catalog, before validation.
///
/// Catalog entries are tolerated with any of id/artist/url missing; a
/// track only enters the ingest pipeline once [`Track::into_valid`]
/// succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog-assigned stable identifier. Absent for some entries
    /// (e.g. local files in a playlist).
    pub id: Option<String>,
    pub name: String,
    /// Primary artist display name.
    pub artist: Option<String>,
    /// Canonical external link to the song.
    pub url: Option<String>,
}

impl Track {
    /// Promote to a [`ValidTrack`] when both artist and url are present.
    ///
    /// Tracks missing either are excluded from ingestion; this is not an
    /// error for the surrounding batch.
    pub fn into_valid(self) -> Option<ValidTrack> {
        match (self.artist, self.url) {
            (Some(artist), Some(url)) => Some(ValidTrack {
                id: self.id,
                name: self.name,
                artist,
                url,
            }),
            _ => None,
        }
    }
}

/// A track that passed ingestion validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidTrack {
    pub id: Option<String>,
    pub name: String,
    pub artist: String,
    pub url: String,
}

impl ValidTrack {
    /// Metadata payload stored alongside the track's vector.
    #[must_use]
    pub fn metadata(&self) -> SongMetadata {
        SongMetadata {
            name: self.name.clone(),
            artist: self.artist.clone(),
            url: self.url.clone(),
        }
    }

    /// Deterministic vibe text used when description generation fails
    /// for this track.
    #[must_use]
    pub fn fallback_vibe(&self) -> String {
        format!("Music by {}", self.artist)
    }
}
