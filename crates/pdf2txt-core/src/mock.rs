//! Mock PDF backend for testing.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{BackendError, PdfBackend, PdfDocument};

/// One scripted page of a [`MockBackend`] document.
#[derive(Clone, Debug)]
pub enum MockPage {
    /// Extraction succeeds with this text.
    Text(String),
    /// Extraction fails with this message.
    Error(String),
}

#[derive(Clone, Debug)]
enum MockEntry {
    Pages(Vec<MockPage>),
    OpenError(String),
}

/// A hand-rolled mock implementing [`PdfBackend`] for tests.
///
/// Documents are keyed by file name, so tests can place real (empty) files in
/// a temp directory for the existence check and script the content here.
/// Any file name that was not registered fails to open, like a malformed PDF.
/// Every `open` call is recorded and can be inspected with
/// [`opened()`](MockBackend::opened).
#[derive(Default)]
pub struct MockBackend {
    entries: HashMap<OsString, MockEntry>,
    opened: Mutex<Vec<PathBuf>>,
    open_count: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document whose pages all extract successfully.
    pub fn with_document(self, name: &str, pages: &[&str]) -> Self {
        let pages = pages.iter().map(|p| MockPage::Text(p.to_string())).collect();
        self.with_pages(name, pages)
    }

    /// Register a document with scripted page results.
    pub fn with_pages(mut self, name: &str, pages: Vec<MockPage>) -> Self {
        self.entries.insert(name.into(), MockEntry::Pages(pages));
        self
    }

    /// Register a document that fails to open.
    pub fn with_open_error(mut self, name: &str, message: &str) -> Self {
        self.entries
            .insert(name.into(), MockEntry::OpenError(message.to_string()));
        self
    }

    /// Number of times [`PdfBackend::open`] was called.
    pub fn open_count(&self) -> usize {
        self.open_count.load(Ordering::SeqCst)
    }

    /// Paths passed to [`PdfBackend::open`], in call order.
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl PdfBackend for MockBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        self.open_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(path.to_path_buf());
        }

        let entry = path
            .file_name()
            .and_then(|name| self.entries.get(name))
            .cloned();

        match entry {
            Some(MockEntry::Pages(pages)) => Ok(Box::new(MockDocument { pages })),
            Some(MockEntry::OpenError(message)) => Err(BackendError::OpenError(message)),
            None => Err(BackendError::OpenError("no objects found".into())),
        }
    }
}

struct MockDocument {
    pages: Vec<MockPage>,
}

impl PdfDocument for MockDocument {
    fn page_count(&self) -> Result<usize, BackendError> {
        Ok(self.pages.len())
    }

    fn extract_page_text(&self, page_index: usize) -> Result<String, BackendError> {
        match self.pages.get(page_index) {
            Some(MockPage::Text(text)) => Ok(text.clone()),
            Some(MockPage::Error(message)) => Err(BackendError::ExtractionError(message.clone())),
            None => Err(BackendError::ExtractionError(format!(
                "page index {} out of range",
                page_index
            ))),
        }
    }
}
