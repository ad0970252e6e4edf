//! Text embeddings.
//!
//! Purely a capability wrapper: text in, fixed-dimension vector out.
//! Embedding failures are not locally recoverable; they escalate and
//! abort the surrounding pipeline stage.

use async_trait::async_trait;

use crate::error::{PipelineError, PipelineResult};
use crate::gemini::GeminiClient;

/// The embedding capability as the pipelines see it.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> PipelineResult<Vec<f32>>;

    /// Embed several texts in one call. Order-preserving: the result has
    /// the same length and order as the input.
    async fn embed_batch(&self, texts: &[String]) -> PipelineResult<Vec<Vec<f32>>>;
}

/// Gemini-backed embedder.
#[derive(Debug, Clone)]
pub struct GeminiEmbedder {
    client: GeminiClient,
    model: String,
}

impl GeminiEmbedder {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str) -> PipelineResult<Vec<f32>> {
        self.client.embed_content(&self.model, text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> PipelineResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.client.batch_embed(&self.model, texts).await?;
        if vectors.len() != texts.len() {
            // The order-preserving contract is broken; nothing can be
            // zipped back safely.
            return Err(PipelineError::Embedding {
                message: format!(
                    "embedding service returned {} vectors for {} texts",
                    vectors.len(),
                    texts.len()
                ),
            });
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embed_batch_empty_is_no_op() {
        let embedder = GeminiEmbedder::new(GeminiClient::new("key").unwrap(), "embed-model");
        let vectors = embedder.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
