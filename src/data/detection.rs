use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::DocumentError;
use crate::rtf::{has_rtf_signature, RTF_SIGNATURE};
use crate::utils::is_docx;

/// Extensions that may hold a loadable document.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["doc", "rtf", "docx", "pdf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Binary Word document, converted by an external program
    Doc,
    Rtf,
    Docx,
    Pdf,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Doc => "doc",
            DocumentType::Rtf => "rtf",
            DocumentType::Docx => "docx",
            DocumentType::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased extension of `path`, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
}

pub fn has_supported_extension(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Whether the file starts with the RTF signature.
pub fn is_rtf(path: &Path) -> Result<bool> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;

    let mut head = Vec::with_capacity(RTF_SIGNATURE.len());
    file.take(RTF_SIGNATURE.len() as u64)
        .read_to_end(&mut head)
        .with_context(|| format!("Failed to read file: {:?}", path))?;

    Ok(has_rtf_signature(&head))
}

/// Detect the document type from the extension, checking signatures where
/// an extension is ambiguous. `.doc` and `.pdf` files are not validated.
pub fn get_type(path: &Path) -> Result<DocumentType> {
    let ext = extension_of(path);

    match ext.as_str() {
        // RTF is routinely saved with a .doc extension
        "doc" | "rtf" => {
            if is_rtf(path)? {
                Ok(DocumentType::Rtf)
            } else {
                Ok(DocumentType::Doc)
            }
        }
        "docx" if is_docx(path)? => Ok(DocumentType::Docx),
        "pdf" => Ok(DocumentType::Pdf),
        _ => Err(DocumentError::UnknownType { extension: ext }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::docx_parser::tests::write_docx;
    use std::fs;
    use tempfile::TempDir;

    fn unknown_extension(err: &anyhow::Error) -> Option<&str> {
        match err.downcast_ref::<DocumentError>() {
            Some(DocumentError::UnknownType { extension }) => Some(extension.as_str()),
            _ => None,
        }
    }

    #[test]
    fn test_rtf_saved_as_doc() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("letter.DOC");
        fs::write(&path, r"{\rtf1\ansi Hi}").unwrap();

        assert!(is_rtf(&path).unwrap());
        assert_eq!(get_type(&path).unwrap(), DocumentType::Rtf);
    }

    #[test]
    fn test_binary_doc_is_not_validated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.doc");
        fs::write(&path, b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1").unwrap();
        assert_eq!(get_type(&path).unwrap(), DocumentType::Doc);

        let short = dir.path().join("tiny.rtf");
        fs::write(&short, "{\\rt").unwrap();
        assert_eq!(get_type(&short).unwrap(), DocumentType::Doc);
    }

    #[test]
    fn test_docx_detection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.docx");
        write_docx(&path, "<w:document/>", true);
        assert_eq!(get_type(&path).unwrap(), DocumentType::Docx);

        let fake = dir.path().join("fake.docx");
        fs::write(&fake, "not a zip").unwrap();
        let err = get_type(&fake).unwrap_err();
        assert_eq!(unknown_extension(&err), Some("docx"));
    }

    #[test]
    fn test_pdf_by_extension_only() {
        // No file access happens for .pdf
        assert_eq!(
            get_type(Path::new("/nonexistent/paper.Pdf")).unwrap(),
            DocumentType::Pdf
        );
    }

    #[test]
    fn test_unknown_extension() {
        let err = get_type(Path::new("notes.txt")).unwrap_err();
        assert_eq!(unknown_extension(&err), Some("txt"));

        let err = get_type(Path::new("README")).unwrap_err();
        assert_eq!(unknown_extension(&err), Some(""));
    }

    #[test]
    fn test_missing_rtf_is_io_error() {
        let err = get_type(Path::new("/nonexistent/doc-loader/a.rtf")).unwrap_err();
        assert_eq!(unknown_extension(&err), None);
    }

    #[test]
    fn test_supported_extensions() {
        assert!(has_supported_extension(Path::new("a/b.RTF")));
        assert!(!has_supported_extension(Path::new("a/b.odt")));
    }
}
