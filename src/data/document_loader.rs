use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::detection::{get_type, DocumentType};
use crate::config::LoaderConfig;
use crate::error::DocumentError;
use crate::rtf::{has_rtf_signature, RtfTextExtractor};
use crate::utils::{convert_doc, read_docx_content, read_docx_rows, read_pdf_content};

/// Reads `.doc`, `.rtf`, `.docx` and `.pdf` files as plain text
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    config: LoaderConfig,
    rtf: RtfTextExtractor,
}

impl DocumentLoader {
    pub fn new(config: LoaderConfig) -> Self {
        let rtf = RtfTextExtractor::new(config.rtf);
        Self { config, rtf }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn get_type(&self, path: &Path) -> Result<DocumentType> {
        get_type(path)
    }

    /// Detect the type of `path` and return its text
    pub fn read_document_content(&self, path: &Path) -> Result<String> {
        let doc_type = get_type(path)?;
        self.read_as(path, doc_type)
    }

    /// Read `path` with the reader for an already detected type
    pub fn read_as(&self, path: &Path, doc_type: DocumentType) -> Result<String> {
        match doc_type {
            DocumentType::Doc => self.read_doc(path),
            DocumentType::Rtf => self.read_rtf(path),
            DocumentType::Docx => self.read_docx_content(path),
            DocumentType::Pdf => self.read_pdf(path),
        }
    }

    /// Binary Word document through the configured external converter
    pub fn read_doc(&self, path: &Path) -> Result<String> {
        if get_type(path)? != DocumentType::Doc {
            return Err(DocumentError::WrongType {
                path: path.to_path_buf(),
                expected: DocumentType::Doc,
            }
            .into());
        }

        convert_doc(path, self.config.doc_method, &self.config.program_dirs)
    }

    pub fn read_rtf(&self, path: &Path) -> Result<String> {
        info!("Extracting text from RTF: {:?}", path);

        let bytes = fs::read(path).with_context(|| format!("Failed to read RTF file: {:?}", path))?;
        if !has_rtf_signature(&bytes) {
            return Err(DocumentError::WrongType {
                path: path.to_path_buf(),
                expected: DocumentType::Rtf,
            }
            .into());
        }

        let raw = String::from_utf8_lossy(&bytes);
        let extraction = self.rtf.extract_with_stats(&raw);

        if !extraction.is_well_formed() {
            warn!(
                "Malformed RTF in {:?}: {} unmatched closing braces, {} unclosed groups",
                path, extraction.unbalanced_closes, extraction.unclosed_groups
            );
        }
        if extraction.overflowed_groups > 0 {
            warn!(
                "Dropped {} groups nested deeper than {:?} in {:?}",
                extraction.overflowed_groups,
                self.rtf.limits().max_group_depth,
                path
            );
        }
        if extraction.truncated {
            warn!(
                "RTF output truncated at {:?} characters: {:?}",
                self.rtf.limits().max_output_len,
                path
            );
        }
        debug!("Extracted {} characters from RTF", extraction.text.len());

        Ok(extraction.text)
    }

    pub fn read_docx_rows(&self, path: &Path) -> Result<Vec<String>> {
        read_docx_rows(path, self.config.keep_empty_lines)
    }

    pub fn read_docx_content(&self, path: &Path) -> Result<String> {
        read_docx_content(path, self.config.keep_empty_lines)
    }

    pub fn read_pdf(&self, path: &Path) -> Result<String> {
        read_pdf_content(path)
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}
