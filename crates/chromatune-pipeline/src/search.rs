//! The search pipeline.
//!
//! Turns a text and/or image vibe into one query embedding and ranks the
//! indexed corpus against it. Image description is best-effort: when the
//! vision step fails but text was also supplied, the search proceeds on
//! the text alone.

use image::ImageFormat;
use serde::Serialize;

use chromatune_core::model::SearchResult;

use crate::context::AppContext;
use crate::error::{PipelineError, PipelineResult};

/// Hits returned per search.
pub const SEARCH_TOP_K: usize = 5;

/// Raster image bytes with a verified MIME type.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImagePayload {
    /// Validate raw bytes as a known raster format.
    ///
    /// The format is sniffed from the bytes themselves; filenames and
    /// caller-supplied content types are not trusted.
    pub fn from_bytes(bytes: Vec<u8>) -> PipelineResult<Self> {
        let format = image::guess_format(&bytes)
            .map_err(|_| PipelineError::validation("image bytes are not a recognised raster format"))?;
        let mime_type = match format {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
            other => {
                return Err(PipelineError::validation(format!(
                    "unsupported image format {other:?}"
                )))
            }
        };
        Ok(Self {
            bytes,
            mime_type: mime_type.to_string(),
        })
    }
}

/// One search invocation's inputs. At least one of the two must carry
/// usable content.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub text: Option<String>,
    pub image: Option<ImagePayload>,
}

/// Ranked search output, ascending by distance.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// The composed text the query embedding was built from.
    pub query_text: String,
    pub songs: Vec<SearchResult>,
}

/// Rank the indexed corpus against a text and/or image vibe.
pub async fn search(ctx: &AppContext, request: SearchRequest) -> PipelineResult<SearchResponse> {
    let text = request.text.as_deref().map(str::trim).unwrap_or_default();
    if text.is_empty() && request.image.is_none() {
        return Err(PipelineError::validation(
            "search needs a text query, an image, or both",
        ));
    }

    let image_vibe = match &request.image {
        Some(image) => match ctx.describer.describe_image(image).await {
            Ok(vibe) => vibe,
            Err(e) => {
                log::warn!("Image description failed, continuing on text only: {e}");
                String::new()
            }
        },
        None => String::new(),
    };

    // Image vibe first, user text second; the original query format.
    let query_text = format!("{image_vibe} {text}").trim().to_string();
    if query_text.is_empty() {
        return Err(PipelineError::validation(
            "image could not be described and no text query was given",
        ));
    }

    if ctx.index.is_empty() {
        return Err(PipelineError::IndexNotReady);
    }

    log::info!("Searching for: {query_text}");
    let vector = ctx.embedder.embed(&query_text).await?;
    let songs = ctx
        .index
        .query(&vector, SEARCH_TOP_K)
        .into_iter()
        .map(|(metadata, score)| SearchResult::from_metadata(metadata, score))
        .collect();

    Ok(SearchResponse { query_text, songs })
}
