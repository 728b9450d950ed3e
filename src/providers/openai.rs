//! OpenAI-compatible provider for embeddings and chat generation
//!
//! One client serves both provider traits; different deployments are
//! distinguished only by base URL, model names, and API key.

use async_trait::async_trait;
use futures_util::{future, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OpenAiConfig;
use crate::error::{Error, Result};

use super::{EmbeddingProvider, GenerationProvider, GenerationRequest, TokenStream};

/// Client for an OpenAI-compatible API
#[derive(Debug)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    embed_model: String,
    chat_model: String,
    dimensions: usize,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a new client. Fails when no API key is configured.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::MissingCredential("OPENAI_API_KEY".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            embed_model: config.embed_model.clone(),
            chat_model: config.chat_model.clone(),
            dimensions: config.dimensions,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn messages_for(&self, request: &GenerationRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt.clone(),
        });
        messages
    }

    fn chat_body(&self, request: &GenerationRequest, stream: bool) -> ChatRequest {
        ChatRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.chat_model.clone()),
            messages: self.messages_for(request),
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            temperature: request.temperature.unwrap_or(self.temperature),
            stream,
        }
    }

    async fn post_embeddings(&self, input: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        let body = EmbeddingsRequest {
            model: &self.embed_model,
            input,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!("HTTP {}: {}", status, detail)));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("malformed response: {}", e)))?;

        if parsed.data.len() != input.len() {
            return Err(Error::embedding(format!(
                "expected {} embeddings, got {}",
                input.len(),
                parsed.data.len()
            )));
        }

        // the API does not guarantee response order; the index field does
        let mut entries = parsed.data;
        entries.sort_by_key(|e| e.index);
        Ok(entries.into_iter().map(|e| e.embedding).collect())
    }

    /// Extract content deltas from buffered SSE lines
    fn drain_sse_lines(buffer: &mut String) -> String {
        let mut text = String::new();
        while let Some(pos) = buffer.find('\n') {
            let line: String = buffer.drain(..=pos).collect();
            let line = line.trim();
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();
            if data == "[DONE]" {
                continue;
            }
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(data) {
                if let Some(delta) = value["choices"][0]["delta"]["content"].as_str() {
                    text.push_str(delta);
                }
            }
        }
        text
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut vectors = self.post_embeddings(&input).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::embedding("empty response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.post_embeddings(texts).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[async_trait]
impl GenerationProvider for OpenAiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.chat_body(&request, false);

        tracing::debug!(model = %body.model, "generation request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::generation(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!("HTTP {}: {}", status, detail)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("malformed response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::generation("response contained no choices".to_string()))
    }

    async fn generate_stream(&self, request: GenerationRequest) -> Result<TokenStream> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.chat_body(&request, true);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::generation(format!("stream request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!("HTTP {}: {}", status, detail)));
        }

        // SSE fragments can split mid-line; buffer until newline. A transport
        // failure mid-stream becomes an inline marker fragment, then the
        // stream ends.
        let stream = response
            .bytes_stream()
            .scan((String::new(), false), |(buffer, failed), chunk| {
                if *failed {
                    return future::ready(None);
                }
                let fragment = match chunk {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                        Self::drain_sse_lines(buffer)
                    }
                    Err(e) => {
                        *failed = true;
                        format!("\n[stream error: {}]", e)
                    }
                };
                future::ready(Some(fragment))
            })
            .filter(|fragment| future::ready(!fragment.is_empty()));

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_a_validation_error() {
        let config = OpenAiConfig::default();
        let err = OpenAiClient::new(&config).unwrap_err();
        assert!(matches!(err, Error::MissingCredential(_)));
    }

    #[test]
    fn sse_lines_parse_deltas_in_order() {
        let mut buffer = String::from(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\
             data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\
             data: [DONE]\n",
        );
        let text = OpenAiClient::drain_sse_lines(&mut buffer);
        assert_eq!(text, "Hello");
        assert!(buffer.is_empty());
    }

    #[test]
    fn sse_partial_line_stays_buffered() {
        let mut buffer = String::from("data: {\"choices\":[{\"delta\":{\"con");
        let text = OpenAiClient::drain_sse_lines(&mut buffer);
        assert!(text.is_empty());
        assert!(!buffer.is_empty());

        buffer.push_str("tent\":\"hi\"}}]}\n");
        assert_eq!(OpenAiClient::drain_sse_lines(&mut buffer), "hi");
    }
}
