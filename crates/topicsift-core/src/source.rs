use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to open document: {0}")]
    Open(String),
    #[error("failed to extract page text: {0}")]
    Extraction(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF support not compiled in (enable the `pdf` feature of topicsift-ingest)")]
    NoPdfSupport,
}

/// Trait for page text backends.
///
/// Implementors turn a document into its plain text, one string per physical
/// page, in document order. Everything after that (merging, extraction) lives
/// in this crate.
pub trait PageSource: Send + Sync {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, SourceError>;
}

/// Plain UTF-8 text with pages separated by form feeds, as written by `pdftotext`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFileSource;

impl TextFileSource {
    pub fn split_pages(text: &str) -> Vec<String> {
        if text.is_empty() {
            return vec![];
        }
        let mut pages: Vec<String> = text.split('\x0c').map(str::to_string).collect();
        // pdftotext terminates the last page with a form feed too
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        pages
    }
}

impl PageSource for TextFileSource {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, SourceError> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| SourceError::Open(format!("{}: not valid UTF-8 ({e})", path.display())))?;
        Ok(Self::split_pages(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn splits_on_form_feed() {
        let pages = TextFileSource::split_pages("one\x0ctwo\x0cthree\x0c");
        assert_eq!(pages, ["one", "two", "three"]);
    }

    #[test]
    fn single_page_without_separator() {
        assert_eq!(TextFileSource::split_pages("only"), ["only"]);
    }

    #[test]
    fn empty_text_has_no_pages() {
        assert!(TextFileSource::split_pages("").is_empty());
    }

    #[test]
    fn reads_pages_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first\x0csecond").unwrap();
        let pages = TextFileSource.page_texts(file.path()).unwrap();
        assert_eq!(pages, ["first", "second"]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TextFileSource
            .page_texts(Path::new("/definitely/not/here.txt"))
            .unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }

    #[test]
    fn invalid_utf8_is_open_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00]).unwrap();
        let err = TextFileSource.page_texts(file.path()).unwrap_err();
        assert!(matches!(err, SourceError::Open(_)));
    }
}
