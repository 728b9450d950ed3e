//! Single-document RAG chat over PDF files
//!
//! Upload one PDF, process it into a searchable index (embedding or
//! keyword backed), and answer questions grounded strictly in the
//! document's content. A generic chat passthrough is available alongside
//! the grounded path.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use docchat_rag::{OpenAiClient, PdfExtractor, RagConfig, RagService};
//!
//! # async fn run() -> docchat_rag::Result<()> {
//! let config = RagConfig::load(None)?;
//! let openai = Arc::new(OpenAiClient::new(&config.openai)?);
//! let service = RagService::new(
//!     config,
//!     Arc::new(PdfExtractor),
//!     openai.clone(),
//!     openai,
//! )?;
//!
//! service.upload("manual.pdf", &std::fs::read("manual.pdf")?)?;
//! service.process("manual.pdf").await?;
//! let response = service.query("How do I install it?", None).await?;
//! println!("{}", response.answer);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod providers;
pub mod registry;
pub mod service;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, ErrorCategory, Result};
pub use generation::PromptBuilder;
pub use index::{DocumentIndex, IndexKind, ScoredChunk};
pub use ingestion::{PdfExtractor, TextChunker, TextExtractor};
pub use providers::{
    EmbeddingProvider, GenerationProvider, GenerationRequest, OpenAiClient, TokenStream,
};
pub use registry::DocumentRegistry;
pub use service::{QueryResponse, RagService};
pub use storage::{IndexStore, UploadStore};
pub use types::{Chunk, DocumentRecord, DocumentStatus};
