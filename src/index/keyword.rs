//! Keyword-overlap index

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::Chunk;

use super::ScoredChunk;

/// Index that stores chunk texts verbatim and scores by word-set overlap.
///
/// No build-time transformation; all work happens at query time, which is
/// fine at single-document scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordIndex {
    chunks: Vec<String>,
}

impl KeywordIndex {
    /// Build the index from chunks, preserving document order
    pub fn build(chunks: &[Chunk]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.text.clone()).collect(),
        }
    }

    /// Number of stored chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Search for the `k` chunks sharing the most words with the query.
    ///
    /// Chunks sharing no words are dropped, so the result may be empty;
    /// ties keep document order.
    pub fn search(&self, query: &str, k: usize) -> Vec<ScoredChunk> {
        let query_words = tokenize(query);
        if query_words.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let overlap = tokenize(chunk).intersection(&query_words).count();
                (overlap > 0).then(|| ScoredChunk {
                    text: chunk.clone(),
                    score: overlap as f32,
                })
            })
            .collect();

        // stable sort keeps original chunk order on equal scores
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        scored
    }
}

/// Lowercased word set of a text, on `\w+` boundaries
fn tokenize(text: &str) -> HashSet<String> {
    // the pattern is a literal; construction cannot fail
    static WORD: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let word = WORD.get_or_init(|| Regex::new(r"\w+").unwrap());

    word.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}
