//! Provider traits for embeddings and generation

pub mod openai;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::error::Result;

pub use openai::OpenAiClient;

/// Trait for generating text embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, order-preserving.
    ///
    /// Default implementation calls `embed` sequentially; implementations
    /// with native batch endpoints should override.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensionality
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// A finite, non-restartable sequence of generated text fragments.
///
/// Dropping the stream aborts the underlying request, so a disconnected
/// caller stops further provider I/O promptly.
pub type TokenStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Parameters for a single generation call
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Optional system/developer message
    pub system: Option<String>,
    /// User-visible prompt
    pub prompt: String,
    /// Model override; providers fall back to their configured default
    pub model: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// Build a request carrying only a prompt
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// Trait for text generation
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a complete response
    async fn generate(&self, request: GenerationRequest) -> Result<String>;

    /// Generate a streamed response. A mid-stream provider failure yields
    /// an inline error-marker fragment and ends the stream; it never
    /// panics the consumer.
    async fn generate_stream(&self, request: GenerationRequest) -> Result<TokenStream>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
