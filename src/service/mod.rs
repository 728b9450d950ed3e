//! The RAG service: orchestrates upload, processing, retrieval, and chat
//!
//! This is the processing boundary from the error-handling design:
//! failures during processing are recorded into the document record as an
//! `error` state and also returned to the caller. Query and chat failures
//! are per-request and never touch the registry.

use std::sync::Arc;

use serde::Serialize;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::index::{DocumentIndex, ScoredChunk};
use crate::ingestion::{TextChunker, TextExtractor};
use crate::providers::{EmbeddingProvider, GenerationProvider, GenerationRequest, TokenStream};
use crate::registry::DocumentRegistry;
use crate::storage::{IndexStore, UploadStore};
use crate::types::{Chunk, DocumentRecord, DocumentStatus};

/// Answer to a document-grounded query
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    /// Generated answer text
    pub answer: String,
    /// Filename of the document answered from
    pub document: String,
    /// Retrieved chunks, best-first, as sent to the model
    pub chunks: Vec<ScoredChunk>,
}

/// Single-document RAG service
pub struct RagService {
    config: RagConfig,
    registry: DocumentRegistry,
    uploads: UploadStore,
    indexes: IndexStore,
    chunker: TextChunker,
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
}

impl RagService {
    /// Create the service, opening its storage directories and registry
    pub fn new(
        config: RagConfig,
        extractor: Arc<dyn TextExtractor>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Result<Self> {
        let uploads = UploadStore::new(&config.storage.upload_dir)?;
        let indexes = IndexStore::new(&config.storage.index_dir)?;
        let registry = DocumentRegistry::open(config.storage.index_dir.join("documents.json"));
        let chunker = TextChunker::from_config(&config.chunking);

        tracing::info!(
            backend = ?config.retrieval.backend,
            embedder = embedder.name(),
            generator = generator.name(),
            "RAG service initialized"
        );

        Ok(Self {
            config,
            registry,
            uploads,
            indexes,
            chunker,
            extractor,
            embedder,
            generator,
        })
    }

    /// Store a new document, replacing whatever came before.
    ///
    /// Purges every existing record, raw file, and persisted index before
    /// creating the new `uploaded` record; the registry holds at most one
    /// record by construction.
    pub fn upload(&self, filename: &str, bytes: &[u8]) -> Result<DocumentRecord> {
        UploadStore::validate_filename(filename)?;

        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if !extension.eq_ignore_ascii_case("pdf") {
            return Err(Error::InvalidFileType(extension.to_string()));
        }

        let limit = self.config.storage.max_upload_size;
        if bytes.len() as u64 > limit {
            return Err(Error::UploadTooLarge {
                size: bytes.len() as u64,
                limit,
            });
        }

        self.indexes.purge_all()?;
        self.uploads.purge_all()?;
        let (record, _purged) = self.registry.register_upload(filename);

        self.uploads.save(filename, bytes)?;
        tracing::info!(filename, size = bytes.len(), "document uploaded");
        Ok(record)
    }

    /// Extract, chunk, index, and persist the uploaded document.
    ///
    /// On failure the record enters the `error` state with the failure
    /// detail, the raw file stays on disk for a retry, and the error is
    /// returned to the caller.
    pub async fn process(&self, filename: &str) -> Result<DocumentRecord> {
        self.registry.begin_processing(filename)?;
        tracing::info!(filename, "processing document");

        match self.run_processing(filename).await {
            Ok(chunk_count) => {
                let record = self.registry.mark_indexed(filename, chunk_count)?;
                tracing::info!(filename, chunk_count, "document indexed");
                Ok(record)
            }
            Err(e) => {
                tracing::error!(filename, error = %e, "processing failed");
                // the processing failure is the error worth reporting; a
                // record that vanished underneath us only gets logged
                if let Err(mark_err) = self.registry.mark_error(filename, e.to_string()) {
                    tracing::warn!(filename, error = %mark_err, "could not record error state");
                }
                Err(e)
            }
        }
    }

    async fn run_processing(&self, filename: &str) -> Result<u32> {
        let bytes = self.uploads.read(filename)?;
        let text = self.extractor.extract(filename, &bytes)?;

        let chunks: Vec<Chunk> = self
            .chunker
            .split(&text)
            .into_iter()
            .enumerate()
            .map(|(i, t)| Chunk::new(t, i as u32, filename.to_string()))
            .collect();
        tracing::debug!(filename, count = chunks.len(), "text chunked");

        let index = DocumentIndex::build(
            self.config.retrieval.backend,
            &chunks,
            self.embedder.as_ref(),
        )
        .await?;

        self.indexes.save(filename, &index)?;
        Ok(chunks.len() as u32)
    }

    /// Load the active index and retrieve up to `k` chunks for a question
    async fn retrieve(&self, question: &str, k: usize) -> Result<(DocumentRecord, Vec<ScoredChunk>)> {
        let record = self.registry.active().ok_or(Error::NoDocumentIndexed)?;

        if record.status != DocumentStatus::Indexed {
            return Err(Error::DocumentNotReady {
                filename: record.filename.clone(),
                status: record.status.to_string(),
            });
        }

        // each load is an independent copy; concurrent queries never share
        // a mutable index
        let index = self.indexes.load(&record.filename)?;
        let chunks = index.search(question, k, self.embedder.as_ref()).await?;

        if chunks.is_empty() {
            return Err(Error::NoRelevantContent);
        }

        Ok((record, chunks))
    }

    /// Answer a question from the indexed document
    pub async fn query(&self, question: &str, top_k: Option<usize>) -> Result<QueryResponse> {
        let k = top_k.unwrap_or(self.config.retrieval.top_k);
        let (record, chunks) = self.retrieve(question, k).await?;

        let context = PromptBuilder::build_context(&chunks);
        let prompt = PromptBuilder::build_grounded_prompt(question, &context);
        let answer = self
            .generator
            .generate(GenerationRequest::prompt(prompt))
            .await?;

        Ok(QueryResponse {
            answer,
            document: record.filename,
            chunks,
        })
    }

    /// Answer a question from the indexed document, streaming fragments
    pub async fn query_stream(&self, question: &str, top_k: Option<usize>) -> Result<TokenStream> {
        let k = top_k.unwrap_or(self.config.retrieval.top_k);
        let (_, chunks) = self.retrieve(question, k).await?;

        let context = PromptBuilder::build_context(&chunks);
        let prompt = PromptBuilder::build_grounded_prompt(question, &context);
        self.generator
            .generate_stream(GenerationRequest::prompt(prompt))
            .await
    }

    /// Generic chat passthrough, no retrieval
    pub async fn chat(
        &self,
        developer_message: &str,
        user_message: &str,
        model: Option<String>,
    ) -> Result<String> {
        self.generator
            .generate(GenerationRequest {
                system: Some(developer_message.to_string()),
                prompt: user_message.to_string(),
                model,
                ..Default::default()
            })
            .await
    }

    /// Generic chat passthrough, no retrieval: a developer/system message
    /// plus the user message, streamed
    pub async fn chat_stream(
        &self,
        developer_message: &str,
        user_message: &str,
        model: Option<String>,
    ) -> Result<TokenStream> {
        self.generator
            .generate_stream(GenerationRequest {
                system: Some(developer_message.to_string()),
                prompt: user_message.to_string(),
                model,
                ..Default::default()
            })
            .await
    }

    /// Delete a document: its record, raw file, and persisted index.
    /// Unknown identifiers fail with a not-found error.
    pub fn delete(&self, filename: &str) -> Result<DocumentRecord> {
        let record = self.registry.remove(filename)?;
        self.uploads.delete(filename)?;
        self.indexes.delete(filename)?;
        tracing::info!(filename, "document deleted");
        Ok(record)
    }

    /// The active document's record, if any
    pub fn status(&self) -> Option<DocumentRecord> {
        self.registry.active()
    }

    /// Configuration in use
    pub fn config(&self) -> &RagConfig {
        &self.config
    }
}
