use std::path::Path;

use topicsift_core::{PageSource, SourceError, TextFileSource};

// Re-export the backends for callers that want to pick one explicitly
#[cfg(feature = "pdf")]
pub use topicsift_pdf_mupdf::MupdfSource;

/// Page source that picks a backend from the file extension:
/// - `.txt` → form-feed separated plain text
/// - anything else → PDF (requires the `pdf` feature / mupdf)
#[derive(Debug, Clone, Default)]
pub struct DocumentSource {
    #[cfg(feature = "pdf")]
    pdf: MupdfSource,
}

impl DocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom-configured PDF backend.
    #[cfg(feature = "pdf")]
    pub fn with_pdf(pdf: MupdfSource) -> Self {
        Self { pdf }
    }
}

fn is_text(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

impl PageSource for DocumentSource {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, SourceError> {
        if is_text(path) {
            tracing::debug!(path = %path.display(), "reading plain-text pages");
            return TextFileSource.page_texts(path);
        }
        self.pdf_pages(path)
    }
}

impl DocumentSource {
    #[cfg(feature = "pdf")]
    fn pdf_pages(&self, path: &Path) -> Result<Vec<String>, SourceError> {
        self.pdf.page_texts(path)
    }

    #[cfg(not(feature = "pdf"))]
    fn pdf_pages(&self, _path: &Path) -> Result<Vec<String>, SourceError> {
        Err(SourceError::NoPdfSupport)
    }
}

/// Load the per-page text of a PDF or `.txt` file with default settings.
pub fn load_pages(path: &Path) -> Result<Vec<String>, SourceError> {
    DocumentSource::new().page_texts(path)
}
