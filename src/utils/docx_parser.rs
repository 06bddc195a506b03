use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Top-level directories every Word package carries.
const PACKAGE_DIRS: [&str; 3] = ["word", "docProps", "_rels"];

const PARAGRAPH: &[u8] = b"w:p";
const TEXT_RUN: &[u8] = b"w:t";

#[derive(Debug, Default)]
struct Paragraph {
    text: String,
    has_text: bool,
}

/// Whether `path` is a zip holding the directories of a Word package.
/// Files that are not zip archives at all count as "no".
pub fn is_docx(path: &Path) -> Result<bool> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;

    let archive = match ZipArchive::new(BufReader::new(file)) {
        Ok(archive) => archive,
        Err(e) => {
            debug!("{:?} is not a zip archive: {}", path, e);
            return Ok(false);
        }
    };

    Ok(PACKAGE_DIRS.iter().all(|dir| {
        let prefix = format!("{}/", dir);
        archive.file_names().any(|name| name.starts_with(&prefix))
    }))
}

/// One entry per `w:p` paragraph, trimmed, in document order.
///
/// With `keep_empty_lines` unset, paragraphs without any text run are
/// dropped.
pub fn read_docx_rows(path: &Path, keep_empty_lines: bool) -> Result<Vec<String>> {
    info!("Extracting text from DOCX: {:?}", path);

    let file = File::open(path).with_context(|| format!("Failed to open DOCX: {:?}", path))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("Failed to read DOCX as zip archive: {:?}", path))?;

    let mut xml_content = String::new();
    match archive.by_name(DOCUMENT_PART) {
        Ok(mut part) => {
            part.read_to_string(&mut xml_content)
                .with_context(|| format!("Failed to read {} from {:?}", DOCUMENT_PART, path))?;
        }
        Err(ZipError::FileNotFound) => {
            return Err(DocumentError::MissingPart {
                path: path.to_path_buf(),
                part: DOCUMENT_PART.to_string(),
            }
            .into());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to open {} in {:?}", DOCUMENT_PART, path))
        }
    }

    let rows = paragraphs_from_xml(&xml_content, keep_empty_lines)
        .with_context(|| format!("Failed to parse {} in {:?}", DOCUMENT_PART, path))?;

    info!("Extracted {} paragraphs from DOCX", rows.len());
    Ok(rows)
}

/// Paragraph rows joined with newlines.
pub fn read_docx_content(path: &Path, keep_empty_lines: bool) -> Result<String> {
    Ok(read_docx_rows(path, keep_empty_lines)?.join("\n"))
}

fn paragraphs_from_xml(xml_content: &str, keep_empty_lines: bool) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml_content);

    let mut paragraphs: Vec<Paragraph> = Vec::new();
    // Indices into `paragraphs` of the currently open `w:p` elements.
    let mut open = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                PARAGRAPH => {
                    open.push(paragraphs.len());
                    paragraphs.push(Paragraph::default());
                }
                TEXT_RUN => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == PARAGRAPH {
                    paragraphs.push(Paragraph::default());
                }
            }
            Ok(Event::Text(e)) => {
                if let (true, Some(&idx)) = (in_text, open.last()) {
                    let text = e.unescape()?;
                    if !text.is_empty() {
                        let paragraph = &mut paragraphs[idx];
                        paragraph.text.push_str(&text);
                        paragraph.has_text = true;
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                PARAGRAPH => {
                    open.pop();
                }
                TEXT_RUN => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("XML error at position {}", reader.buffer_position())
                });
            }
            _ => {}
        }
    }

    Ok(paragraphs
        .into_iter()
        .filter(|p| keep_empty_lines || p.has_text)
        .map(|p| p.text.trim().to_string())
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Dear </w:t></w:r><w:r><w:t xml:space="preserve">Sir &amp; Madam </w:t></w:r></w:p>
    <w:p/>
    <w:p><w:pPr><w:jc w:val="center"/></w:pPr></w:p>
    <w:p><w:r><w:t>  Regards  </w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    /// Write a minimal Word package. Without `package_dirs` only the
    /// document part is stored.
    pub(crate) fn write_docx(path: &Path, document_xml: &str, package_dirs: bool) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        if package_dirs {
            zip.start_file("_rels/.rels", options).unwrap();
            zip.write_all(b"<Relationships/>").unwrap();
            zip.start_file("docProps/core.xml", options).unwrap();
            zip.write_all(b"<coreProperties/>").unwrap();
        }
        zip.start_file(DOCUMENT_PART, options).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_paragraph_rows() {
        let rows = paragraphs_from_xml(BODY, true).unwrap();
        assert_eq!(rows, vec!["Dear Sir & Madam", "", "", "Regards"]);
    }

    #[test]
    fn test_drop_paragraphs_without_text() {
        let rows = paragraphs_from_xml(BODY, false).unwrap();
        assert_eq!(rows, vec!["Dear Sir & Madam", "Regards"]);
    }

    #[test]
    fn test_nested_paragraphs_in_start_order() {
        let xml = r#"<w:body><w:p><w:r><w:t>outer</w:t></w:r><w:txbxContent><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:txbxContent></w:p></w:body>"#;
        let rows = paragraphs_from_xml(xml, true).unwrap();
        assert_eq!(rows, vec!["outer", "inner"]);
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(paragraphs_from_xml("<w:p><w:t>x</w:p>", true).is_err());
    }

    #[test]
    fn test_read_docx_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("letter.docx");
        write_docx(&path, BODY, true);

        assert!(is_docx(&path).unwrap());
        assert_eq!(
            read_docx_content(&path, true).unwrap(),
            "Dear Sir & Madam\n\n\nRegards"
        );
    }

    #[test]
    fn test_is_docx_requires_package_dirs() {
        let dir = TempDir::new().unwrap();
        let bare = dir.path().join("bare.docx");
        write_docx(&bare, BODY, false);
        assert!(!is_docx(&bare).unwrap());

        let not_zip = dir.path().join("text.docx");
        std::fs::write(&not_zip, "plain text").unwrap();
        assert!(!is_docx(&not_zip).unwrap());
    }

    #[test]
    fn test_missing_document_part() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.docx");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("word/styles.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"<w:styles/>").unwrap();
        zip.finish().unwrap();

        let err = read_docx_rows(&path, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DocumentError>(),
            Some(DocumentError::MissingPart { .. })
        ));
    }
}
