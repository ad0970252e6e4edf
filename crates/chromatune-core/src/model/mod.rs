//! Domain types shared across the pipelines.

mod playlist;
mod song;
mod track;

pub use playlist::PlaylistRecord;
pub use song::{SearchResult, SongMetadata};
pub use track::{Track, ValidTrack};
