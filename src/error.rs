use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

use crate::data::DocumentType;

/// Failures a caller may want to tell apart from plain I/O trouble.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unknown file type - extension: {extension:?}")]
    UnknownType { extension: String },

    #[error("{path:?} is not a {expected} document")]
    WrongType { path: PathBuf, expected: DocumentType },

    #[error("'{program}' not found - please install it. Searched in:\n  {}", .searched.join("\n  "))]
    ProgramNotFound { program: String, searched: Vec<String> },

    #[error("{program} failed on {path:?}: {status}")]
    ConverterFailed {
        program: String,
        path: PathBuf,
        status: ExitStatus,
    },

    #[error("{path:?} has no {part} entry")]
    MissingPart { path: PathBuf, part: String },
}
