//! Durable storage for serialized indexes

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::index::DocumentIndex;

/// File extension for serialized indexes
const INDEX_EXT: &str = "index";

/// Persists one serialized index per document, keyed by filename.
///
/// Saves are write-then-publish: the payload lands in a temp file in the
/// store directory and is renamed over the target, so readers never see a
/// partially written index.
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Storage path for a document's index: `{filename}.index`
    fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", filename, INDEX_EXT))
    }

    /// Atomically persist the index for a document
    pub fn save(&self, filename: &str, index: &DocumentIndex) -> Result<()> {
        let payload = serde_json::to_vec(index)
            .map_err(|e| Error::indexing(format!("serializing index: {}", e)))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| Error::indexing(format!("temp file for index: {}", e)))?;
        tmp.write_all(&payload)
            .map_err(|e| Error::indexing(format!("writing index: {}", e)))?;
        tmp.persist(self.path_for(filename))
            .map_err(|e| Error::indexing(format!("publishing index: {}", e)))?;

        tracing::debug!(filename, bytes = payload.len(), "index persisted");
        Ok(())
    }

    /// Load the persisted index for a document.
    ///
    /// The reconstructed index is behaviorally identical to the one saved;
    /// no embedding provider call is involved.
    pub fn load(&self, filename: &str) -> Result<DocumentIndex> {
        let path = self.path_for(filename);
        let payload = match fs::read(&path) {
            Ok(p) => p,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::IndexNotFound(filename.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&payload)?)
    }

    /// Delete a document's index; returns whether one existed
    pub fn delete(&self, filename: &str) -> Result<bool> {
        match fs::remove_file(self.path_for(filename)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every persisted index
    pub fn purge_all(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(INDEX_EXT) {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Directory this store writes into
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::KeywordIndex;
    use crate::providers::EmbeddingProvider;
    use crate::types::Chunk;
    use async_trait::async_trait;

    struct NullEmbedder;

    #[async_trait]
    impl EmbeddingProvider for NullEmbedder {
        async fn embed(&self, _text: &str) -> crate::error::Result<Vec<f32>> {
            Ok(vec![0.0])
        }

        fn dimensions(&self) -> usize {
            1
        }

        fn name(&self) -> &str {
            "null"
        }
    }

    fn sample_index() -> DocumentIndex {
        let chunks = vec![
            Chunk::new("first chunk of text".to_string(), 0, "a.pdf".to_string()),
            Chunk::new("second chunk here".to_string(), 1, "a.pdf".to_string()),
        ];
        DocumentIndex::Keyword(KeywordIndex::build(&chunks))
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();
        let index = sample_index();

        store.save("a.pdf", &index).unwrap();
        let loaded = store.load("a.pdf").unwrap();
        assert_eq!(loaded, index);
    }

    #[tokio::test]
    async fn reloaded_index_searches_identically() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();
        let index = sample_index();
        store.save("a.pdf", &index).unwrap();
        let loaded = store.load("a.pdf").unwrap();

        let embedder = NullEmbedder;
        let before = index.search("second chunk", 3, &embedder).await.unwrap();
        let after = loaded.search("second chunk", 3, &embedder).await.unwrap();
        assert_eq!(before, after);
        assert!(!after.is_empty());
    }

    #[test]
    fn missing_index_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();
        let err = store.load("ghost.pdf").unwrap_err();
        assert!(matches!(err, Error::IndexNotFound(_)));
    }

    #[test]
    fn delete_reports_existence() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();
        store.save("a.pdf", &sample_index()).unwrap();

        assert!(store.delete("a.pdf").unwrap());
        assert!(!store.delete("a.pdf").unwrap());
    }

    #[test]
    fn purge_removes_only_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();
        store.save("a.pdf", &sample_index()).unwrap();
        store.save("b.pdf", &sample_index()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"keep me").unwrap();

        assert_eq!(store.purge_all().unwrap(), 2);
        assert!(dir.path().join("notes.txt").exists());
    }
}
