use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::EnvFilter;

use doc_loader::data::DocumentType;
use doc_loader::utils::{squeeze_blank_lines, DocMethod};
use doc_loader::{DocumentLoader, LoaderConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Extract plain text from every document under a directory")]
struct Args {
    /// Input directory containing .doc/.rtf/.docx/.pdf files
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for extracted text
    #[arg(short, long)]
    output: PathBuf,

    /// Collapse runs of blank lines and strip trailing whitespace
    #[arg(long)]
    squeeze_blank: bool,

    /// Path to configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Converter for binary .doc files
    #[arg(long, value_enum)]
    method: Option<DocMethod>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DocumentMetadata {
    filename: String,
    source: PathBuf,
    file_type: DocumentType,
    character_count: usize,
    line_count: usize,
    processed_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CorpusMetadata {
    total_documents: usize,
    total_characters: usize,
    documents: Vec<DocumentMetadata>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Starting corpus extraction");
    info!("Input directory: {:?}", args.input);
    info!("Output directory: {:?}", args.output);

    let mut config = match &args.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    };
    if let Some(method) = args.method {
        config.doc_method = method;
    }
    config.validate()?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory: {:?}", args.output))?;

    let loader = DocumentLoader::new(config);
    let loaded = loader.load_directory(&args.input)?;

    let corpus_path = args.output.join("corpus.jsonl");
    let mut corpus_file = BufWriter::new(
        fs::File::create(&corpus_path)
            .with_context(|| format!("Failed to create corpus file: {:?}", corpus_path))?,
    );

    let mut documents = Vec::with_capacity(loaded.len());

    for (idx, doc) in loaded.into_iter().enumerate() {
        let text = if args.squeeze_blank {
            squeeze_blank_lines(&doc.text)
        } else {
            doc.text
        };

        let filename = output_name(&args.input, &doc.path);
        let doc_path = args.output.join(format!("{}.txt", filename));
        fs::write(&doc_path, &text)
            .with_context(|| format!("Failed to write document: {:?}", doc_path))?;

        let json_line = serde_json::json!({
            "id": idx,
            "filename": filename,
            "type": doc.doc_type,
            "text": text,
        });
        writeln!(corpus_file, "{}", serde_json::to_string(&json_line)?)?;

        documents.push(DocumentMetadata {
            filename,
            source: doc.path,
            file_type: doc.doc_type,
            character_count: text.chars().count(),
            line_count: text.lines().count(),
            processed_at: unix_timestamp(),
        });
    }

    corpus_file.flush()?;
    info!("Corpus saved to: {:?}", corpus_path);

    let metadata = CorpusMetadata {
        total_documents: documents.len(),
        total_characters: documents.iter().map(|d| d.character_count).sum(),
        documents,
    };

    let metadata_path = args.output.join("metadata.json");
    let metadata_json = serde_json::to_string_pretty(&metadata)?;
    fs::write(&metadata_path, metadata_json)
        .with_context(|| format!("Failed to write metadata: {:?}", metadata_path))?;
    info!("Metadata saved to: {:?}", metadata_path);

    info!("Extraction complete!");
    info!("Summary:");
    info!("  - Documents: {}", metadata.total_documents);
    info!("  - Characters: {}", metadata.total_characters);

    Ok(())
}

/// Path of `doc` relative to `root`, extension dropped, directories joined
/// with `__` so documents in different folders cannot collide.
fn output_name(root: &Path, doc: &Path) -> String {
    let relative = doc.strip_prefix(root).unwrap_or(doc).with_extension("");
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("__")
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
