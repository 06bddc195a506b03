use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use doc_loader::utils::DocMethod;
use doc_loader::{DocumentLoader, LoaderConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Extract plain text from .doc, .rtf, .docx and .pdf files")]
struct Cli {
    /// Path to configuration JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Converter for binary .doc files (overrides the config file)
    #[arg(long, value_enum, global = true)]
    method: Option<DocMethod>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the detected document type
    Type(FileArgs),
    /// Print the type and text of a document
    Read(FileArgs),
    /// Print the type and text of every document under a directory
    ReadAll(DirArgs),
}

#[derive(Debug, Args)]
struct FileArgs {
    /// Document to inspect
    file: PathBuf,
}

#[derive(Debug, Args)]
struct DirArgs {
    /// Directory to walk recursively
    dir: PathBuf,
}

fn main() -> Result<()> {
    // Logs go to stderr so extracted text can be piped
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let loader = DocumentLoader::new(load_config(&cli)?);

    match cli.command {
        Commands::Type(args) => type_command(&loader, args),
        Commands::Read(args) => read_command(&loader, args),
        Commands::ReadAll(args) => read_all_command(&loader, args),
    }
}

fn load_config(cli: &Cli) -> Result<LoaderConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            LoaderConfig::from_file(path)?
        }
        None => LoaderConfig::default(),
    };

    if let Some(method) = cli.method {
        config.doc_method = method;
    }

    config.validate()?;
    Ok(config)
}

fn type_command(loader: &DocumentLoader, args: FileArgs) -> Result<()> {
    let doc_type = loader.get_type(&args.file)?;
    println!("{}", doc_type);
    Ok(())
}

fn read_command(loader: &DocumentLoader, args: FileArgs) -> Result<()> {
    let doc_type = loader.get_type(&args.file)?;
    let text = loader.read_as(&args.file, doc_type)?;

    let mut out = io::stdout().lock();
    writeln!(out, "Document {} is of type '{}'", args.file.display(), doc_type)?;
    writeln!(out, "Content: \n")?;
    writeln!(out, "{}", text)?;
    Ok(())
}

fn read_all_command(loader: &DocumentLoader, args: DirArgs) -> Result<()> {
    let documents = loader.load_directory(&args.dir)?;

    let mut out = io::stdout().lock();
    for doc in &documents {
        writeln!(out, "=============================")?;
        writeln!(out, "Document {} is of type '{}'", doc.path.display(), doc.doc_type)?;
        writeln!(out, "---------")?;
        writeln!(out, "File contents:\n---------")?;
        writeln!(out, "{}", doc.text)?;
        out.flush()?;
    }

    info!("Printed {} documents", documents.len());
    Ok(())
}
