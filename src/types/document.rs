//! Document records and chunks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of the active document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Raw file stored, not yet processed
    Uploaded,
    /// Extraction, chunking, and index build in flight
    Processing,
    /// Index built and persisted
    Indexed,
    /// Processing failed; retriable
    Error,
}

impl DocumentStatus {
    /// Short lowercase label for messages and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Indexed => "indexed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of the single active document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique record ID
    pub id: Uuid,
    /// Original filename as uploaded; also the storage key
    pub filename: String,
    /// Lifecycle state
    pub status: DocumentStatus,
    /// Number of chunks created (set on successful indexing)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<u32>,
    /// Error detail (set when processing fails)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    /// When the file was uploaded
    pub uploaded_at: DateTime<Utc>,
    /// When the record last changed state
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Create a fresh record for a newly uploaded file
    pub fn uploaded(filename: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            filename,
            status: DocumentStatus::Uploaded,
            chunk_count: None,
            error_detail: None,
            uploaded_at: now,
            updated_at: now,
        }
    }

    /// Enter the processing state; clears any previous outcome
    pub fn mark_processing(&mut self) {
        self.status = DocumentStatus::Processing;
        self.chunk_count = None;
        self.error_detail = None;
        self.updated_at = Utc::now();
    }

    /// Record a successful index build
    pub fn mark_indexed(&mut self, chunk_count: u32) {
        self.status = DocumentStatus::Indexed;
        self.chunk_count = Some(chunk_count);
        self.error_detail = None;
        self.updated_at = Utc::now();
    }

    /// Record a processing failure; the raw file is kept for retries
    pub fn mark_error(&mut self, detail: String) {
        self.status = DocumentStatus::Error;
        self.chunk_count = None;
        self.error_detail = Some(detail);
        self.updated_at = Utc::now();
    }
}

/// A bounded substring of a document, the unit of indexing and retrieval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Text content
    pub text: String,
    /// Position within the document's chunk sequence
    pub ordinal: u32,
    /// Source document filename
    pub document: String,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: String, ordinal: u32, document: String) -> Self {
        Self {
            text,
            ordinal,
            document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_update_fields() {
        let mut record = DocumentRecord::uploaded("manual.pdf".to_string());
        assert_eq!(record.status, DocumentStatus::Uploaded);
        assert!(record.chunk_count.is_none());

        record.mark_processing();
        assert_eq!(record.status, DocumentStatus::Processing);

        record.mark_indexed(10);
        assert_eq!(record.status, DocumentStatus::Indexed);
        assert_eq!(record.chunk_count, Some(10));
        assert!(record.error_detail.is_none());

        record.mark_error("embedding provider unreachable".to_string());
        assert_eq!(record.status, DocumentStatus::Error);
        assert!(record.chunk_count.is_none());
        assert_eq!(
            record.error_detail.as_deref(),
            Some("embedding provider unreachable")
        );
    }

    #[test]
    fn reprocessing_clears_error_detail() {
        let mut record = DocumentRecord::uploaded("manual.pdf".to_string());
        record.mark_processing();
        record.mark_error("boom".to_string());

        record.mark_processing();
        assert_eq!(record.status, DocumentStatus::Processing);
        assert!(record.error_detail.is_none());
    }
}
