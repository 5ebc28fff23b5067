use std::path::Path;

use mupdf::{Document, Page, TextPageFlags};

use topicsift_core::{PageSource, SourceError};

/// MuPDF-based implementation of [`PageSource`].
///
/// Kept in its own crate so the native mupdf build stays out of everything
/// that does not read PDFs.
///
/// Page text is emitted block by block, line by line, which matches what a
/// plain `get_text()` dump gives. Running headers and footers are kept by
/// default since the model is told to ignore them; set an exclusion ratio to
/// drop the top/bottom band of every page instead.
#[derive(Debug, Clone, Default)]
pub struct MupdfSource {
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    header_exclusion_ratio: Option<f32>,
}

impl MupdfSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    fn page_text(&self, page: &Page) -> Result<String, SourceError> {
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| SourceError::Extraction(e.to_string()))?;

        let page_bounds = page
            .bounds()
            .map_err(|e| SourceError::Extraction(e.to_string()))?;
        let page_height = page_bounds.y1 - page_bounds.y0;

        let header_threshold = self
            .header_exclusion_ratio
            .map(|r| page_bounds.y0 + page_height * r);
        let footer_threshold = self
            .footer_exclusion_ratio
            .map(|r| page_bounds.y1 - page_height * r);

        let mut text = String::new();
        for block in text_page.blocks() {
            let block_bounds = block.bounds();

            if let Some(threshold) = header_threshold
                && block_bounds.y1 <= threshold
            {
                continue;
            }
            if let Some(threshold) = footer_threshold
                && block_bounds.y0 >= threshold
            {
                continue;
            }

            for line in block.lines() {
                text.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
                text.push('\n');
            }
        }
        Ok(text)
    }
}

impl PageSource for MupdfSource {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, SourceError> {
        if !path.exists() {
            return Err(SourceError::Open(format!(
                "file not found: {}",
                path.display()
            )));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| SourceError::Open("invalid path encoding".into()))?;

        let document = Document::open(path_str).map_err(|e| SourceError::Open(e.to_string()))?;

        let mut pages = Vec::new();
        for page_result in document
            .pages()
            .map_err(|e| SourceError::Extraction(e.to_string()))?
        {
            let page = page_result.map_err(|e| SourceError::Extraction(e.to_string()))?;
            pages.push(self.page_text(&page)?);
        }

        tracing::debug!(path = %path.display(), pages = pages.len(), "read PDF pages");
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_open_error() {
        let err = MupdfSource::new()
            .page_texts(Path::new("/no/such/file.pdf"))
            .unwrap_err();
        assert!(matches!(err, SourceError::Open(_)));
    }

    #[test]
    fn zero_ratio_disables_exclusion() {
        let source = MupdfSource::new()
            .with_header_exclusion(0.04)
            .with_footer_exclusion(0.0);
        assert_eq!(source.header_exclusion_ratio, Some(0.04));
        assert_eq!(source.footer_exclusion_ratio, None);
    }
}
