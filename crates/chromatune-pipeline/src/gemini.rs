//! Gemini API client.
//!
//! Thin typed wrapper over the Generative Language REST API: text
//! generation, vision-capable generation (inline image data), and text
//! embeddings. Capability-level behavior (prompts, sanitising, pacing,
//! fallbacks) lives in the `describe` and `embed` modules.

use std::time::Duration;

use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

// ---------------------------------------------------------------------------
// API payload types (private -- the REST API nests content awkwardly)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    content: EmbedContent,
}

#[derive(Debug, Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(Debug, Serialize)]
struct EmbedPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<BatchEmbedItem>,
}

#[derive(Debug, Serialize)]
struct BatchEmbedItem {
    model: String,
    content: EmbedContent,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("chromatune/0.1.0 (https://github.com/chromatune/chromatune)")
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    /// Override the API base URL (for tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Generate text from a prompt.
    pub async fn generate_text(&self, model: &str, prompt: &str) -> PipelineResult<String> {
        self.generate(
            model,
            vec![Part {
                text: Some(prompt.to_string()),
                inline_data: None,
            }],
        )
        .await
    }

    /// Generate text from a prompt plus an inline image.
    pub async fn generate_with_image(
        &self,
        model: &str,
        prompt: &str,
        image: &[u8],
        mime_type: &str,
    ) -> PipelineResult<String> {
        self.generate(
            model,
            vec![
                Part {
                    text: Some(prompt.to_string()),
                    inline_data: None,
                },
                Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: mime_type.to_string(),
                        data: base64::engine::general_purpose::STANDARD.encode(image),
                    }),
                },
            ],
        )
        .await
    }

    async fn generate(&self, model: &str, parts: Vec<Part>) -> PipelineResult<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| PipelineError::Generation {
                message: e.to_string(),
            })?;

        let result: GenerateResponse =
            response.json().await.map_err(|e| PipelineError::Generation {
                message: format!("unparseable response: {e}"),
            })?;

        let text = result
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(PipelineError::Generation {
                message: "model returned no candidates".to_string(),
            });
        }
        Ok(text)
    }

    /// Embed a single text.
    pub async fn embed_content(&self, model: &str, text: &str) -> PipelineResult<Vec<f32>> {
        let url = format!("{}/models/{}:embedContent", self.base_url, model);
        let request = EmbedRequest {
            content: EmbedContent {
                parts: vec![EmbedPart {
                    text: text.to_string(),
                }],
            },
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| PipelineError::Embedding {
                message: e.to_string(),
            })?;

        let result: EmbedResponse =
            response.json().await.map_err(|e| PipelineError::Embedding {
                message: format!("unparseable response: {e}"),
            })?;

        Ok(result.embedding.values)
    }

    /// Embed several texts in one call, order-preserving.
    pub async fn batch_embed(
        &self,
        model: &str,
        texts: &[String],
    ) -> PipelineResult<Vec<Vec<f32>>> {
        let url = format!("{}/models/{}:batchEmbedContents", self.base_url, model);
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| BatchEmbedItem {
                    model: format!("models/{model}"),
                    content: EmbedContent {
                        parts: vec![EmbedPart { text: text.clone() }],
                    },
                })
                .collect(),
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| PipelineError::Embedding {
                message: e.to_string(),
            })?;

        let result: BatchEmbedResponse =
            response.json().await.map_err(|e| PipelineError::Embedding {
                message: format!("unparseable response: {e}"),
            })?;

        Ok(result.embeddings.into_iter().map(|e| e.values).collect())
    }
}
