//! Single-document conversion: open, extract every page, join with page
//! headers and write the result atomically.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::backend::{BackendError, PdfBackend};
use crate::job::ConversionJob;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("page {page}: {source}")]
    Page {
        /// 1-based page number.
        page: usize,
        #[source]
        source: BackendError,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a successful conversion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub output_path: PathBuf,
    pub pages: usize,
    pub bytes_written: usize,
}

/// Converts PDF documents to text files through a [`PdfBackend`].
pub struct Converter<'a> {
    backend: &'a dyn PdfBackend,
}

impl<'a> Converter<'a> {
    pub fn new(backend: &'a dyn PdfBackend) -> Self {
        Self { backend }
    }

    pub fn convert(&self, job: &ConversionJob) -> Result<ConversionReport, ConvertError> {
        self.convert_with(job, |_| {})
    }

    /// Convert `job`, calling `on_page_count` once the page count is known and
    /// before any page is extracted.
    ///
    /// Any page failing to extract fails the whole document. The output file
    /// is only replaced after every page succeeded and the text was fully
    /// written, so a failed conversion never leaves truncated output behind.
    pub fn convert_with(
        &self,
        job: &ConversionJob,
        on_page_count: impl FnOnce(usize),
    ) -> Result<ConversionReport, ConvertError> {
        let document = self.backend.open(&job.input_path)?;
        let pages = document.page_count()?;
        on_page_count(pages);

        let mut texts = Vec::with_capacity(pages);
        for index in 0..pages {
            let text = document
                .extract_page_text(index)
                .map_err(|source| ConvertError::Page {
                    page: index + 1,
                    source,
                })?;
            tracing::debug!(
                path = %job.input_path.display(),
                page = index + 1,
                chars = text.len(),
                "extracted page"
            );
            texts.push(text);
        }
        drop(document);

        let content = render_pages(&texts);
        write_atomically(&job.output_path, &content).map_err(|source| ConvertError::Write {
            path: job.output_path.clone(),
            source,
        })?;

        tracing::info!(
            path = %job.output_path.display(),
            pages,
            bytes = content.len(),
            "wrote text output"
        );

        Ok(ConversionReport {
            output_path: job.output_path.clone(),
            pages,
            bytes_written: content.len(),
        })
    }
}

/// Join page texts in document order, each preceded by a
/// `"\n--- Page N ---\n"` header (1-indexed). No other separators are added.
pub fn render_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut out = String::new();
    for (i, text) in pages.iter().enumerate() {
        out.push_str(&format!("\n--- Page {} ---\n", i + 1));
        out.push_str(text.as_ref());
    }
    out
}

/// Write `contents` to a temp file beside `path`, then rename it into place.
///
/// The result gets the permissions of the file it replaces, or the umask
/// default for a new file, as if it had been created directly.
fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBackend, MockPage};

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        path
    }

    #[test]
    fn render_pages_inserts_headers_only() {
        let rendered = render_pages(&["Hello", "World"]);
        assert_eq!(rendered, "\n--- Page 1 ---\nHello\n--- Page 2 ---\nWorld");
    }

    #[test]
    fn render_pages_empty_document() {
        let pages: [&str; 0] = [];
        assert_eq!(render_pages(&pages), "");
    }

    #[test]
    fn render_pages_keeps_empty_page_headers() {
        let rendered = render_pages(&["", "text", ""]);
        assert_eq!(
            rendered,
            "\n--- Page 1 ---\n\n--- Page 2 ---\ntext\n--- Page 3 ---\n"
        );
    }

    #[test]
    fn convert_writes_all_pages() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "lecture.pdf");
        let backend = MockBackend::new().with_document("lecture.pdf", &["one", "two", "three"]);

        let job = ConversionJob::for_input(&input);
        let mut seen_pages = None;
        let report = Converter::new(&backend)
            .convert_with(&job, |n| seen_pages = Some(n))
            .unwrap();

        assert_eq!(seen_pages, Some(3));
        assert_eq!(report.pages, 3);
        assert_eq!(report.output_path, dir.path().join("lecture.txt"));

        let written = std::fs::read_to_string(&report.output_path).unwrap();
        assert_eq!(report.bytes_written, written.len());
        for k in 1..=3 {
            assert!(written.contains(&format!("--- Page {} ---", k)));
        }
        let first = written.find("--- Page 1 ---").unwrap();
        let third = written.find("--- Page 3 ---").unwrap();
        assert!(first < third);
    }

    #[test]
    fn convert_preserves_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "greek.pdf");
        let backend = MockBackend::new().with_document("greek.pdf", &["αβγ → ε", "naïve café"]);

        let report = Converter::new(&backend)
            .convert(&ConversionJob::for_input(&input))
            .unwrap();
        let written = std::fs::read_to_string(report.output_path).unwrap();
        assert_eq!(written, "\n--- Page 1 ---\nαβγ → ε\n--- Page 2 ---\nnaïve café");
    }

    #[test]
    fn failing_page_aborts_document_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "broken.pdf");
        let backend = MockBackend::new().with_pages(
            "broken.pdf",
            vec![
                MockPage::Text("fine".into()),
                MockPage::Error("bad content stream".into()),
            ],
        );

        let job = ConversionJob::for_input(&input);
        let err = Converter::new(&backend).convert(&job).unwrap_err();

        assert!(matches!(err, ConvertError::Page { page: 2, .. }));
        assert_eq!(
            err.to_string(),
            "page 2: failed to extract text: bad content stream"
        );
        assert!(!job.output_path.exists());
        // Only the input remains; no stray temp files.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_conversion_leaves_previous_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "old.pdf");
        let job = ConversionJob::for_input(&input);
        std::fs::write(&job.output_path, "previous run").unwrap();

        let backend = MockBackend::new().with_open_error("old.pdf", "trailer not found");
        let err = Converter::new(&backend).convert(&job).unwrap_err();

        assert_eq!(err.to_string(), "failed to open PDF: trailer not found");
        assert_eq!(
            std::fs::read_to_string(&job.output_path).unwrap(),
            "previous run"
        );
    }

    #[test]
    fn successful_conversion_replaces_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "new.pdf");
        let job = ConversionJob::for_input(&input);
        std::fs::write(&job.output_path, "stale").unwrap();

        let backend = MockBackend::new().with_document("new.pdf", &["fresh"]);
        Converter::new(&backend).convert(&job).unwrap();

        assert_eq!(
            std::fs::read_to_string(&job.output_path).unwrap(),
            "\n--- Page 1 ---\nfresh"
        );
    }

    #[cfg(unix)]
    #[test]
    fn new_output_gets_default_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "a.pdf");
        let plain = dir.path().join("plain");
        std::fs::write(&plain, "x").unwrap();
        let plain_mode = std::fs::metadata(&plain).unwrap().permissions().mode() & 0o777;

        let backend = MockBackend::new().with_document("a.pdf", &["text"]);
        let report = Converter::new(&backend)
            .convert(&ConversionJob::for_input(&input))
            .unwrap();

        let mode = std::fs::metadata(report.output_path)
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, plain_mode);
    }

    #[cfg(unix)]
    #[test]
    fn rerun_keeps_existing_output_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "a.pdf");
        let job = ConversionJob::for_input(&input);
        std::fs::write(&job.output_path, "old").unwrap();
        std::fs::set_permissions(&job.output_path, std::fs::Permissions::from_mode(0o640))
            .unwrap();

        let backend = MockBackend::new().with_document("a.pdf", &["new"]);
        Converter::new(&backend).convert(&job).unwrap();

        let mode = std::fs::metadata(&job.output_path)
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o640);
        assert_eq!(
            std::fs::read_to_string(&job.output_path).unwrap(),
            "\n--- Page 1 ---\nnew"
        );
    }

    #[test]
    fn unwritable_output_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "a.pdf");
        let job = ConversionJob::for_input_in(&input, &dir.path().join("missing-dir"));

        let backend = MockBackend::new().with_document("a.pdf", &["text"]);
        let err = Converter::new(&backend).convert(&job).unwrap_err();

        assert!(matches!(err, ConvertError::Write { .. }));
        assert!(err.to_string().starts_with("failed to write "));
        assert!(!job.output_path.exists());
    }
}
