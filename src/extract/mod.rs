//! File-type dispatch and raw text extraction.
//!
//! Format parsers live behind the [`TextExtractor`] capability and are selected by a
//! registry keyed on the lowercased filename extension, keeping format branching out of
//! the ingestion pipeline. Plain text and PDF ship built in; other formats (Word,
//! spreadsheets, slides) are registered by the embedding application.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while turning file bytes into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file was present but could not be decoded or parsed.
    #[error("failed to extract text: {0}")]
    Unreadable(String),
}

/// Capability implemented once per supported file format.
pub trait TextExtractor: Send + Sync {
    /// Produce the raw text of the document, or fail if the bytes are unreadable.
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Extension-keyed registry of format extractors.
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry with no formats registered.
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Create a registry with the built-in plain-text and PDF extractors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(&["txt", "md"], PlainTextExtractor);
        registry.register(&["pdf"], PdfExtractor);
        registry
    }

    /// Register an extractor for a set of filename extensions (lowercase, no dot).
    pub fn register<E: TextExtractor + 'static>(&mut self, extensions: &[&str], extractor: E) {
        let extractor: Arc<dyn TextExtractor> = Arc::new(extractor);
        for extension in extensions {
            self.extractors
                .insert((*extension).to_string(), Arc::clone(&extractor));
        }
    }

    /// Find the extractor responsible for a filename, if its extension is registered.
    pub fn for_file_name(&self, file_name: &str) -> Option<Arc<dyn TextExtractor>> {
        let extension = file_extension(file_name)?;
        self.extractors.get(&extension).cloned()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Lowercased extension of a filename, if any.
pub fn file_extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Extractor for plain text formats; bytes must be valid UTF-8.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        String::from_utf8(bytes.to_vec())
            .map_err(|err| ExtractError::Unreadable(format!("invalid UTF-8: {err}")))
    }
}

/// Extractor for PDF documents backed by the `pdf-extract` crate.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|err| ExtractError::Unreadable(format!("PDF parsing failed: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("Notes.PDF"), Some("pdf".to_string()));
        assert_eq!(file_extension("report.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("README"), None);
    }

    #[test]
    fn registry_dispatches_on_extension() {
        let registry = ExtractorRegistry::with_defaults();
        assert!(registry.for_file_name("notes.txt").is_some());
        assert!(registry.for_file_name("paper.pdf").is_some());
        assert!(registry.for_file_name("deck.pptx").is_none());
        assert!(registry.for_file_name("no-extension").is_none());
    }

    #[test]
    fn custom_extractors_can_be_registered() {
        struct FixedExtractor;
        impl TextExtractor for FixedExtractor {
            fn extract(&self, _bytes: &[u8]) -> Result<String, ExtractError> {
                Ok("fixed".to_string())
            }
        }

        let mut registry = ExtractorRegistry::empty();
        registry.register(&["docx"], FixedExtractor);
        let extractor = registry.for_file_name("notes.docx").expect("registered");
        assert_eq!(extractor.extract(b"ignored").unwrap(), "fixed");
    }

    #[test]
    fn plain_text_round_trips_utf8() {
        let extractor = PlainTextExtractor;
        assert_eq!(extractor.extract("héllo".as_bytes()).unwrap(), "héllo");
    }

    #[test]
    fn plain_text_rejects_invalid_utf8() {
        let extractor = PlainTextExtractor;
        let error = extractor.extract(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(error, ExtractError::Unreadable(_)));
    }
}
