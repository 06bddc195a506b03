use anyhow::{Context, Result};
use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::error::DocumentError;

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\w+)|\$\{([^}]*)\}").expect("valid env var pattern"));

/// External converter for binary Word documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DocMethod {
    /// Prints lists but no headers.
    #[default]
    Antiword,
    /// Prints headers but no lists.
    Catdoc,
}

impl DocMethod {
    pub fn program(&self) -> &'static str {
        match self {
            DocMethod::Antiword => "antiword",
            DocMethod::Catdoc => "catdoc",
        }
    }
}

impl fmt::Display for DocMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Expand `$VAR` and `${VAR}`. Unset variables are left untouched.
pub fn expand_vars(input: &str) -> String {
    ENV_VAR
        .replace_all(input, |caps: &Captures| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

fn candidate_paths(program: &str, dirs: &[String]) -> Vec<PathBuf> {
    dirs.iter()
        .map(|dir| Path::new(&expand_vars(dir)).join(program))
        .collect()
}

/// First existing `<dir>/<program>` among `dirs`.
pub fn find_program(program: &str, dirs: &[String]) -> Option<PathBuf> {
    candidate_paths(program, dirs).into_iter().find(|p| p.exists())
}

/// Like [`find_program`], but reports every path tried when nothing is found.
pub fn require_program(program: &str, dirs: &[String]) -> Result<PathBuf, DocumentError> {
    let candidates = candidate_paths(program, dirs);
    if let Some(found) = candidates.iter().find(|p| p.exists()) {
        debug!("Found {} at {:?}", program, found);
        return Ok(found.clone());
    }

    Err(DocumentError::ProgramNotFound {
        program: program.to_string(),
        searched: candidates.iter().map(|p| p.display().to_string()).collect(),
    })
}

/// Run the converter on `path` and return what it printed.
pub fn convert_doc(path: &Path, method: DocMethod, dirs: &[String]) -> Result<String> {
    let program = require_program(method.program(), dirs)?;
    info!("Converting {:?} with {}", path, method);

    let output = Command::new(&program)
        .arg(path)
        .output()
        .with_context(|| format!("Failed to run {:?} on {:?}", program, path))?;

    if !output.status.success() {
        return Err(DocumentError::ConverterFailed {
            program: method.program().to_string(),
            path: path.to_path_buf(),
            status: output.status,
        }
        .into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
