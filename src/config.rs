use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::rtf::RtfLimits;
use crate::utils::DocMethod;

/// Directories searched for external converters, in order.
/// Environment variables (`$HOME`, `${HOME}`) are expanded at lookup time.
pub const DEFAULT_PROGRAM_DIRS: &[&str] = &[
    "$HOME/Environment/local/bin/",
    "$HOME/bin/",
    "/share/apps/bin/",
    "/usr/local/bin/",
    "/usr/bin/",
];

const DEFAULT_MAX_GROUP_DEPTH: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Converter used for binary `.doc` files.
    pub doc_method: DocMethod,
    pub program_dirs: Vec<String>,
    /// Keep DOCX paragraphs that carry no text.
    pub keep_empty_lines: bool,
    pub rtf: RtfLimits,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            doc_method: DocMethod::default(),
            program_dirs: DEFAULT_PROGRAM_DIRS.iter().map(|d| d.to_string()).collect(),
            keep_empty_lines: true,
            rtf: RtfLimits {
                max_group_depth: Some(DEFAULT_MAX_GROUP_DEPTH),
                max_output_len: None,
            },
        }
    }
}

impl LoaderConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Self = serde_json::from_str(&config_str)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.program_dirs.is_empty(), "program_dirs must not be empty");
        ensure!(
            self.rtf.max_group_depth != Some(0),
            "rtf.max_group_depth must be > 0"
        );
        ensure!(
            self.rtf.max_output_len != Some(0),
            "rtf.max_output_len must be > 0"
        );
        Ok(())
    }
}

impl fmt::Display for LoaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
