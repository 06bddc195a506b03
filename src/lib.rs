// Library exports for use in scripts and other binaries

pub mod config;
pub mod data;
pub mod error;
pub mod rtf;
pub mod utils;

// Re-export commonly used types
pub use config::LoaderConfig;
pub use data::{DocumentLoader, DocumentType, LoadedDocument};
pub use error::DocumentError;
pub use rtf::{extract_rtf_text, RtfLimits, RtfTextExtractor};
