//! Configuration for the RAG pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::index::IndexKind;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Storage directories
    #[serde(default)]
    pub storage: StorageConfig,
    /// Chunking parameters
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval parameters
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// OpenAI-compatible provider settings
    #[serde(default)]
    pub openai: OpenAiConfig,
}

impl RagConfig {
    /// Load configuration: the TOML file if given, defaults otherwise,
    /// then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("failed to parse {}: {}", p.display(), e)))?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                self.openai.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var("DEFAULT_MODEL") {
            if !model.is_empty() {
                self.openai.chat_model = model;
            }
        }
        if let Ok(dir) = std::env::var("DOCCHAT_DATA_DIR") {
            if !dir.is_empty() {
                let base = PathBuf::from(dir);
                self.storage.upload_dir = base.join("uploads");
                self.storage.index_dir = base.join("indexes");
            }
        }
    }
}

/// Storage directories for raw uploads and persisted indexes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the raw uploaded file
    pub upload_dir: PathBuf,
    /// Directory holding serialized indexes and the registry snapshot
    pub index_dir: PathBuf,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docchat");
        Self {
            upload_dir: base.join("uploads"),
            index_dir: base.join("indexes"),
            max_upload_size: 25 * 1024 * 1024, // 25MB
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Index backend to build on processing
    pub backend: IndexKind,
    /// Number of chunks to retrieve per query
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: IndexKind::Embedding,
            top_k: 3,
        }
    }
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key; falls back to the OPENAI_API_KEY environment variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Embedding model
    pub embed_model: String,
    /// Chat/generation model
    pub chat_model: String,
    /// Embedding dimensionality for the configured model
    pub dimensions: usize,
    /// Maximum tokens per generation
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            dimensions: 1536,
            max_tokens: 1000,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}
