//! Searchable indexes over document chunks
//!
//! Two interchangeable strategies behind one tagged type: an embedding
//! index scored by cosine similarity, and a keyword index scored by
//! word-set intersection. The serialized form is the minimal payload
//! (vectors or chunk texts) and never carries provider clients.

pub mod embedding;
pub mod keyword;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

pub use embedding::{cosine_similarity, EmbeddedChunk, EmbeddingIndex};
pub use keyword::KeywordIndex;

/// Which index strategy to build
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Dense vectors from an embedding provider, cosine-scored
    #[default]
    Embedding,
    /// Raw chunk texts, word-overlap-scored
    Keyword,
}

/// A retrieved chunk with its relevance score
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredChunk {
    /// Chunk text
    pub text: String,
    /// Backend-specific score; only ordering is meaningful across backends
    pub score: f32,
}

/// The searchable index built over one document's chunks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum DocumentIndex {
    /// Embedding-vector index
    Embedding(EmbeddingIndex),
    /// Keyword-overlap index
    Keyword(KeywordIndex),
}

impl DocumentIndex {
    /// Build an index of the requested kind. Embedding builds suspend on
    /// provider calls; keyword builds are immediate.
    pub async fn build(
        kind: IndexKind,
        chunks: &[Chunk],
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        match kind {
            IndexKind::Embedding => Ok(Self::Embedding(
                EmbeddingIndex::build(chunks, provider).await?,
            )),
            IndexKind::Keyword => Ok(Self::Keyword(KeywordIndex::build(chunks))),
        }
    }

    /// Search for up to `k` chunks, best-first. The provider is only
    /// consulted for embedding indexes (to embed the query).
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Vec<ScoredChunk>> {
        match self {
            Self::Embedding(index) => index.search(query, k, provider).await,
            Self::Keyword(index) => Ok(index.search(query, k)),
        }
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        match self {
            Self::Embedding(index) => index.len(),
            Self::Keyword(index) => index.len(),
        }
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The strategy this index was built with
    pub fn kind(&self) -> IndexKind {
        match self {
            Self::Embedding(_) => IndexKind::Embedding,
            Self::Keyword(_) => IndexKind::Keyword,
        }
    }
}
