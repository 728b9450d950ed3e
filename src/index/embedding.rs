//! Embedding-vector index with cosine similarity search

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

use super::ScoredChunk;

/// One indexed chunk with its dense vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedChunk {
    /// Chunk text
    pub text: String,
    /// Dense embedding vector
    pub vector: Vec<f32>,
}

/// Index mapping chunk texts to dense vectors.
///
/// The payload is plain data; the embedding provider is passed in at build
/// and query time and never serialized with the index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingIndex {
    entries: Vec<EmbeddedChunk>,
}

impl EmbeddingIndex {
    /// Build the index by embedding every chunk through the provider.
    ///
    /// The batch call is order-preserving, so entry order matches chunk
    /// order (which is the tie-break order at query time).
    pub async fn build(chunks: &[Chunk], provider: &dyn EmbeddingProvider) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = provider.embed_batch(&texts).await?;

        let entries = texts
            .into_iter()
            .zip(vectors)
            .map(|(text, vector)| EmbeddedChunk { text, vector })
            .collect();

        Ok(Self { entries })
    }

    /// Number of stored chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed the query and return the `k` most similar chunks, best-first.
    /// Ties keep insertion order.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Vec<ScoredChunk>> {
        let query_vector = provider.embed(query).await?;

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                text: entry.text.clone(),
                score: cosine_similarity(&query_vector, &entry.vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }
}

/// Cosine similarity of two vectors. A zero-norm vector on either side is
/// defined as similarity 0 rather than a division error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Provider embedding words onto fixed axes, for deterministic tests
    struct AxisEmbedder;

    #[async_trait]
    impl EmbeddingProvider for AxisEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.0f32; 4];
            for word in text.split_whitespace() {
                match word {
                    "north" => v[0] += 1.0,
                    "east" => v[1] += 1.0,
                    "south" => v[2] += 1.0,
                    "west" => v[3] += 1.0,
                    _ => {}
                }
            }
            Ok(v)
        }

        fn dimensions(&self) -> usize {
            4
        }

        fn name(&self) -> &str {
            "axis"
        }
    }

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk::new(t.to_string(), i as u32, "doc.pdf".to_string()))
            .collect()
    }

    #[test]
    fn zero_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0], &[0.0]), 0.0);
    }

    #[test]
    fn parallel_vectors_score_one() {
        let score = cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn search_ranks_by_similarity() {
        let provider = AxisEmbedder;
        let index = EmbeddingIndex::build(
            &chunks(&["north north east", "south west", "north"]),
            &provider,
        )
        .await
        .unwrap();

        let results = index.search("north", 2, &provider).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "north");
        assert_eq!(results[1].text, "north north east");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn zero_query_returns_all_at_zero_without_error() {
        let provider = AxisEmbedder;
        let index = EmbeddingIndex::build(&chunks(&["north", "east"]), &provider)
            .await
            .unwrap();

        // "hello" maps to the zero vector
        let results = index.search("hello", 5, &provider).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.score == 0.0));
        // ties keep insertion order
        assert_eq!(results[0].text, "north");
    }

    #[tokio::test]
    async fn build_preserves_chunk_order() {
        let provider = AxisEmbedder;
        let index = EmbeddingIndex::build(&chunks(&["east", "west", "north"]), &provider)
            .await
            .unwrap();
        let texts: Vec<&str> = index.entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["east", "west", "north"]);
    }
}
