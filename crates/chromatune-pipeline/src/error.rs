//! Pipeline error taxonomy.
//!
//! Dependency errors are translated into one of these kinds at the
//! pipeline boundary rather than propagated raw to callers.

use thiserror::Error;

/// Errors that can occur during ingest or search.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The catalog credential exchange failed. Nothing can be fetched
    /// without a token, so this aborts the operation; it is never
    /// reported as a missing playlist.
    #[error("catalog authentication failed: {message}")]
    Auth { message: String },

    /// The requested entity does not exist (or is privacy-restricted).
    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// The generative model returned malformed or absent output for a
    /// batch. Recovered per batch with fallback descriptions.
    #[error("description generation failed: {message}")]
    Generation { message: String },

    /// The vision capability failed for an image. Recovered as an empty
    /// description.
    #[error("vision description failed: {message}")]
    Vision { message: String },

    /// The embedding capability failed. Not locally recoverable; aborts
    /// the remaining pipeline stage.
    #[error("embedding failed: {message}")]
    Embedding { message: String },

    /// A vector index operation failed. Not locally recoverable.
    #[error("index error: {0}")]
    Index(#[from] chromatune_index::IndexError),

    /// The request was rejected before any external call was made.
    #[error("invalid request: {message}")]
    Validation { message: String },

    /// Ingestion produced no valid tracks for the playlist.
    #[error(
        "no ingestible tracks in playlist {playlist_id}; only tracks with an artist and a link can be indexed"
    )]
    NoTracks { playlist_id: String },

    /// Search was attempted before any index was built or attached.
    #[error("no playlist index is loaded; ingest a playlist first")]
    IndexNotReady,

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// An error propagated from the registry/domain layer.
    #[error("registry error: {0}")]
    Registry(#[from] chromatune_core::Error),
}

impl PipelineError {
    /// Returns `true` when the request itself was rejected (caller error,
    /// 4xx-equivalent) rather than a downstream failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` when the error indicates a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience alias for pipeline results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_predicate() {
        assert!(PipelineError::validation("empty query").is_validation());
        assert!(!PipelineError::IndexNotReady.is_validation());
    }

    #[test]
    fn test_not_found_predicate() {
        let err = PipelineError::NotFound {
            entity: "playlist",
            id: "p1".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }
}
