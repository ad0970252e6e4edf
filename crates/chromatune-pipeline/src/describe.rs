//! Vibe description generation.
//!
//! Asks the generative model for a short, vivid description of each
//! song's mood/setting, one batch at a time, and for a description of a
//! query image's ambiance. The model is asked for a strict JSON array;
//! the response is sanitised (code fences stripped) before parsing.
//! A batch that fails to generate or parse degrades to an empty result;
//! the ingest pipeline falls back to per-track default descriptions
//! rather than failing.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use chromatune_core::model::ValidTrack;

use crate::error::{PipelineError, PipelineResult};
use crate::gemini::GeminiClient;
use crate::resilience::RateLimiter;
use crate::search::ImagePayload;

/// Fixed prompt for the image-to-vibe step.
const IMAGE_VIBE_PROMPT: &str = "You are an AI agent that helps users find music that matches \
their current setting. Please describe the ambiance and vibe of the included image. What types \
of music would be fitting for this setting? What kind of mood is conveyed in the image?";

/// One generated description, positionally matched to the input batch.
///
/// Either field may come back absent when the model mangles an item;
/// a missing vibe is substituted with the track's fallback downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SongVibe {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub vibe: Option<String>,
}

/// The generative description capability as the pipelines see it.
#[async_trait]
pub trait Describer: Send + Sync {
    /// Describe a batch of songs. The returned array is positionally
    /// aligned with the input; callers must tolerate a shorter or longer
    /// array as well as items with a missing vibe (the model is not
    /// fully trustworthy about length or schema).
    async fn describe_batch(&self, songs: &[ValidTrack]) -> PipelineResult<Vec<SongVibe>>;

    /// Describe the vibe of an image. Best-effort; callers recover from
    /// failure with an empty description.
    async fn describe_image(&self, image: &ImagePayload) -> PipelineResult<String>;
}

/// Gemini-backed describer.
///
/// Generation calls are paced at 1 request/second to stay under the
/// provider's free-tier rate limit, success or not.
#[derive(Debug, Clone)]
pub struct GeminiDescriber {
    client: GeminiClient,
    text_model: String,
    vision_model: String,
    pacing: RateLimiter,
    fence: Regex,
}

impl GeminiDescriber {
    pub fn new(
        client: GeminiClient,
        text_model: impl Into<String>,
        vision_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            text_model: text_model.into(),
            vision_model: vision_model.into(),
            pacing: RateLimiter::new(1),
            // The model wraps JSON in markdown fences despite being told
            // not to; strip them before parsing.
            #[allow(clippy::unwrap_used)]
            fence: Regex::new(r"```(?:json)?").unwrap(),
        }
    }

    fn batch_prompt(songs: &[ValidTrack]) -> String {
        let songs_text = songs
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {} by {}", i + 1, s.name, s.artist))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "I have a list of songs. For each song, provide a short, vivid, 1-sentence \
description of the vibe/setting (e.g., \"upbeat city drive\" or \"rainy coffee shop\").\n\n\
RETURN ONLY RAW JSON. Do not use Markdown blocks.\n\
The format must be a list of objects, strictly in the same order as the input:\n\
[\n    {{\"title\": \"Song Title\", \"vibe\": \"Description here\"}},\n    ...\n]\n\n\
Songs to process:\n{songs_text}"
        )
    }

    fn parse_batch(&self, raw: &str) -> PipelineResult<Vec<SongVibe>> {
        let clean = self.fence.replace_all(raw, "");
        let clean = clean.trim();
        let items: Vec<serde_json::Value> =
            serde_json::from_str(clean).map_err(|e| PipelineError::Generation {
                message: format!("malformed description JSON: {e}"),
            })?;

        // Items are validated one at a time; a mangled element keeps its
        // position but loses only its own vibe.
        Ok(items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect())
    }
}

#[async_trait]
impl Describer for GeminiDescriber {
    async fn describe_batch(&self, songs: &[ValidTrack]) -> PipelineResult<Vec<SongVibe>> {
        if songs.is_empty() {
            return Ok(Vec::new());
        }

        self.pacing.acquire().await;
        let prompt = Self::batch_prompt(songs);
        let raw = self.client.generate_text(&self.text_model, &prompt).await?;
        self.parse_batch(&raw)
    }

    async fn describe_image(&self, image: &ImagePayload) -> PipelineResult<String> {
        self.pacing.acquire().await;
        let text = self
            .client
            .generate_with_image(
                &self.vision_model,
                IMAGE_VIBE_PROMPT,
                &image.bytes,
                &image.mime_type,
            )
            .await
            .map_err(|e| PipelineError::Vision {
                message: e.to_string(),
            })?;
        Ok(text.trim().to_string())
    }
}
