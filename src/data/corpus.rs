use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::detection::{has_supported_extension, DocumentType};
use super::document_loader::DocumentLoader;

/// A document read from disk
#[derive(Debug, Clone, Serialize)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub doc_type: DocumentType,
    pub text: String,
}

/// All files under `dir` with a supported extension, in path order
pub fn collect_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| has_supported_extension(path))
        .collect();

    files.sort();
    files
}

impl DocumentLoader {
    /// Load every supported document under `dir`.
    ///
    /// Files that fail to load are logged and skipped; it is an error only
    /// when nothing could be loaded.
    pub fn load_directory(&self, dir: &Path) -> Result<Vec<LoadedDocument>> {
        info!("Loading documents from directory: {:?}", dir);

        let files = collect_documents(dir);
        info!("Found {} document files", files.len());

        let mut documents = Vec::with_capacity(files.len());

        for (idx, path) in files.iter().enumerate() {
            info!("Processing document {}/{}: {:?}", idx + 1, files.len(), path);

            let loaded = self
                .get_type(path)
                .and_then(|doc_type| Ok((doc_type, self.read_as(path, doc_type)?)));

            match loaded {
                Ok((doc_type, text)) => documents.push(LoadedDocument {
                    path: path.clone(),
                    doc_type,
                    text,
                }),
                Err(e) => {
                    warn!("Failed to process document {:?}: {:#}", path, e);
                }
            }
        }

        if documents.is_empty() {
            anyhow::bail!("No documents loaded from {:?}", dir);
        }

        info!("Loaded {}/{} documents", documents.len(), files.len());
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::docx_parser::tests::write_docx;
    use std::fs;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("nested/deeper")).unwrap();

        fs::write(root.join("a.rtf"), r"{\rtf1 Alpha\par}").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();
        fs::write(root.join("nested/deeper/c.RTF"), r"{\rtf1 Gamma}").unwrap();
        // Not a zip, so detection fails and the file is skipped
        fs::write(root.join("nested/broken.docx"), "garbage").unwrap();
        write_docx(
            &root.join("nested/b.docx"),
            "<w:body><w:p><w:r><w:t>Beta</w:t></w:r></w:p></w:body>",
            true,
        );
        dir
    }

    #[test]
    fn test_collect_documents_filters_and_sorts() {
        let dir = sample_tree();
        let names: Vec<String> = collect_documents(dir.path())
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();

        assert_eq!(
            names,
            vec!["a.rtf", "nested/b.docx", "nested/broken.docx", "nested/deeper/c.RTF"]
        );
    }

    #[test]
    fn test_load_directory_skips_failures() {
        let dir = sample_tree();
        let docs = DocumentLoader::default().load_directory(dir.path()).unwrap();

        let summary: Vec<(DocumentType, &str)> =
            docs.iter().map(|d| (d.doc_type, d.text.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (DocumentType::Rtf, "Alpha\n"),
                (DocumentType::Docx, "Beta"),
                (DocumentType::Rtf, "Gamma"),
            ]
        );
    }

    #[test]
    fn test_load_empty_directory_fails() {
        let dir = TempDir::new().unwrap();
        assert!(DocumentLoader::default().load_directory(dir.path()).is_err());
    }
}
