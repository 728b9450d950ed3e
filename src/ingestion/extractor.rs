//! Raw-text extraction from uploaded files

use crate::error::{Error, Result};

/// Extracts plain text from an uploaded file's bytes.
///
/// Unreadable input (corrupt, encrypted, truncated) fails with
/// `Error::Extraction`; a file that parses but holds no text fails with
/// `Error::NoTextContent`, so the registry can record a precise reason.
pub trait TextExtractor: Send + Sync {
    /// Extract plain text from raw file bytes
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<String>;
}

/// PDF text extractor backed by pdf-extract, with a lopdf probe for
/// encrypted documents (pdf-extract reports those with an opaque error).
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self
    }

    fn is_encrypted(bytes: &[u8]) -> bool {
        match lopdf::Document::load_mem(bytes) {
            Ok(doc) => doc.trailer.get(b"Encrypt").is_ok(),
            Err(_) => false,
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::extraction(filename, "file is empty"));
        }

        if Self::is_encrypted(bytes) {
            return Err(Error::extraction(filename, "PDF is encrypted"));
        }

        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| Error::extraction(filename, e.to_string()))?;

        if text.trim().is_empty() {
            tracing::warn!(filename, "PDF parsed but contains no text layer");
            return Err(Error::NoTextContent(filename.to_string()));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn empty_bytes_are_unreadable_not_textless() {
        let extractor = PdfExtractor::new();
        let err = extractor.extract("empty.pdf", &[]).unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
        assert_eq!(err.category(), ErrorCategory::Extraction);
    }

    #[test]
    fn garbage_bytes_fail_extraction() {
        let extractor = PdfExtractor::new();
        let err = extractor
            .extract("junk.pdf", b"this is not a pdf at all")
            .unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }
}
