use anyhow::{Context, Result};
use pdf_extract::extract_text;
use std::path::Path;
use tracing::{info, warn};

/// Text content of a PDF
#[derive(Debug, Clone)]
pub struct PdfContent {
    pub text: String,
    pub pages: Vec<String>,
    /// Non-blank lines in reading order
    pub lines: Vec<String>,
    pub has_text: bool,
}

impl PdfContent {
    fn from_text(text: String) -> Self {
        let has_text = !text.trim().is_empty();

        // pdf-extract separates pages with form feeds
        let pages: Vec<String> = text.split('\x0C').map(|s| s.to_string()).collect();

        let lines = text
            .split(['\n', '\x0C'])
            .map(|line| line.trim_end())
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.to_string())
            .collect();

        Self {
            text,
            pages,
            lines,
            has_text,
        }
    }
}

/// Extract text from a PDF file
pub fn extract_text_from_pdf(path: &Path) -> Result<PdfContent> {
    info!("Extracting text from PDF: {:?}", path);

    let text = extract_text(path)
        .with_context(|| format!("Failed to extract text from PDF: {:?}", path))?;

    let content = PdfContent::from_text(text);

    if !content.has_text {
        warn!("PDF appears to be scanned or has no extractable text: {:?}", path);
    }

    info!(
        "Extracted {} pages ({} lines) from PDF",
        content.pages.len(),
        content.lines.len()
    );

    Ok(content)
}

/// PDF lines joined with newlines
pub fn read_pdf_content(path: &Path) -> Result<String> {
    Ok(extract_text_from_pdf(path)?.lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_skip_blank_and_page_breaks() {
        let content = PdfContent::from_text("Title  \n\n  Body line\n\x0CPage two\n".to_string());
        assert!(content.has_text);
        assert_eq!(content.pages.len(), 2);
        assert_eq!(content.lines, vec!["Title", "  Body line", "Page two"]);
    }

    #[test]
    fn test_blank_pdf_has_no_text() {
        let content = PdfContent::from_text(" \n\x0C\n".to_string());
        assert!(!content.has_text);
        assert!(content.lines.is_empty());
    }

    #[test]
    fn test_missing_pdf_is_an_error() {
        assert!(extract_text_from_pdf(Path::new("/nonexistent/doc-loader/file.pdf")).is_err());
    }
}
