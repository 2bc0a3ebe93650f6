use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
}

/// Trait for PDF text extraction backends.
///
/// Implementors own the binary format: page counting and per-page text
/// reconstruction. Joining pages and writing output lives in
/// [`crate::converter::Converter`].
pub trait PdfBackend: Send + Sync {
    /// Open the document at `path`.
    ///
    /// The returned handle keeps the document open until it is dropped.
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError>;
}

/// An open PDF document.
pub trait PdfDocument {
    /// Number of pages in the document.
    fn page_count(&self) -> Result<usize, BackendError>;

    /// Best-effort plain text of the page at `page_index` (0-based).
    fn extract_page_text(&self, page_index: usize) -> Result<String, BackendError>;
}
