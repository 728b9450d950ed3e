//! Error types for the RAG pipeline

use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upload has an unsupported file type
    #[error("Invalid file type '{0}': only PDF uploads are accepted")]
    InvalidFileType(String),

    /// Filename is empty or contains path components
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// Upload exceeds the configured size limit
    #[error("Upload too large: {size} bytes (limit is {limit} bytes)")]
    UploadTooLarge { size: u64, limit: u64 },

    /// Required API credential is missing
    #[error("Missing API credential: {0}")]
    MissingCredential(String),

    /// Document not found in the registry
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// No persisted index exists for the document
    #[error("No persisted index for document: {0}")]
    IndexNotFound(String),

    /// Source file could not be read (corrupt, encrypted, malformed)
    #[error("Failed to extract text from '{filename}': {message}")]
    Extraction { filename: String, message: String },

    /// Source file parsed fine but yielded no text
    #[error("Document '{0}' contains no extractable text")]
    NoTextContent(String),

    /// Embedding provider failure
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Index build or persistence failure
    #[error("Indexing failed: {0}")]
    Indexing(String),

    /// Query issued while no document is indexed
    #[error("No document indexed: upload and process a document first")]
    NoDocumentIndexed,

    /// Query issued while the document is still uploaded/processing/errored
    #[error("Document '{filename}' is not ready for queries (status: {status})")]
    DocumentNotReady { filename: String, status: String },

    /// Search found no chunk sharing content with the question
    #[error("No relevant content found in the document for this question")]
    NoRelevantContent,

    /// Generation provider failure
    #[error("Generation failed: {0}")]
    Generation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse error grouping, useful for callers mapping errors to exit codes
/// or status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input: file type, size, filename, missing credential
    Validation,
    /// Unknown document or missing persisted index
    NotFound,
    /// Unreadable or textless source
    Extraction,
    /// Embedding, build, or persistence failure during processing
    Indexing,
    /// No document indexed or no relevant content for a query
    Retrieval,
    /// Upstream generation provider failure
    Generation,
    /// IO, serialization, transport
    Internal,
}

impl Error {
    /// Create an extraction error
    pub fn extraction(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an indexing error
    pub fn indexing(message: impl Into<String>) -> Self {
        Self::Indexing(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Classify the error into the coarse taxonomy
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_)
            | Self::InvalidFileType(_)
            | Self::InvalidFilename(_)
            | Self::UploadTooLarge { .. }
            | Self::MissingCredential(_) => ErrorCategory::Validation,
            Self::DocumentNotFound(_) | Self::IndexNotFound(_) => ErrorCategory::NotFound,
            Self::Extraction { .. } | Self::NoTextContent(_) => ErrorCategory::Extraction,
            Self::Embedding(_) | Self::Indexing(_) => ErrorCategory::Indexing,
            Self::NoDocumentIndexed
            | Self::DocumentNotReady { .. }
            | Self::NoRelevantContent => ErrorCategory::Retrieval,
            Self::Generation(_) => ErrorCategory::Generation,
            Self::Io(_) | Self::Json(_) | Self::Http(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        assert_eq!(
            Error::InvalidFileType("exe".into()).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            Error::DocumentNotFound("a.pdf".into()).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            Error::NoTextContent("a.pdf".into()).category(),
            ErrorCategory::Extraction
        );
        assert_eq!(
            Error::embedding("provider down").category(),
            ErrorCategory::Indexing
        );
        assert_eq!(Error::NoDocumentIndexed.category(), ErrorCategory::Retrieval);
        assert_eq!(
            Error::generation("timeout").category(),
            ErrorCategory::Generation
        );
    }

    #[test]
    fn messages_distinguish_retrieval_cases() {
        let no_doc = Error::NoDocumentIndexed.to_string();
        let not_ready = Error::DocumentNotReady {
            filename: "manual.pdf".into(),
            status: "processing".into(),
        }
        .to_string();
        let no_content = Error::NoRelevantContent.to_string();

        assert_ne!(no_doc, not_ready);
        assert_ne!(not_ready, no_content);
        assert!(not_ready.contains("processing"));
    }
}
