use serde::{Deserialize, Serialize};

/// Metadata persisted with each indexed song: the display strings and the
/// canonical link returned verbatim in search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadata {
    pub name: String,
    pub artist: String,
    pub url: String,
}

/// One ranked hit from a similarity search.
///
/// `score` is the index's native distance metric (lower = more similar).
/// It is deliberately never normalised here; interpretation is a
/// presentation concern of the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub artist: String,
    pub url: String,
    pub score: f32,
}

impl SearchResult {
    #[must_use]
    pub fn from_metadata(metadata: SongMetadata, score: f32) -> Self {
        Self {
            name: metadata.name,
            artist: metadata.artist,
            url: metadata.url,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_from_metadata() {
        let meta = SongMetadata {
            name: "So What".to_string(),
            artist: "Miles Davis".to_string(),
            url: "https://example/t2".to_string(),
        };
        let result = SearchResult::from_metadata(meta, 0.42);
        assert_eq!(result.name, "So What");
        assert_eq!(result.score, 0.42);
    }
}
