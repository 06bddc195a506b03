mod corpus;
mod detection;
mod document_loader;

pub use corpus::{collect_documents, LoadedDocument};
pub use detection::{
    extension_of, get_type, has_supported_extension, is_rtf, DocumentType, SUPPORTED_EXTENSIONS,
};
pub use document_loader::DocumentLoader;
