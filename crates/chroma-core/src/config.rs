//! Loader configuration (`chroma.toml`).
//!
//! ```toml
//! batch_size = 16
//! seed = 42
//! mode = "paired"      # or "single"
//! format = "auto"      # single mode: auto | paired | dimacs | structured
//! ```
//!
//! Every key is optional. A missing file yields [`LoaderConfig::default`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::format::GraphFormat;

/// File name looked up inside a dataset directory.
pub const CONFIG_FILE_NAME: &str = "chroma.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    /// Pairs per batch in paired mode.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Fixed shuffle seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub mode: SourceMode,
    #[serde(default)]
    pub format: FormatChoice,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            seed: None,
            mode: SourceMode::default(),
            format: FormatChoice::default(),
        }
    }
}

const fn default_batch_size() -> usize {
    16
}

/// Which kind of batches a dataset produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// SAT/UNSAT pairs from paired-dataset files.
    #[default]
    Paired,
    /// One instance per batch, all labelled SAT.
    Single,
}

/// Input format for single mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatChoice {
    /// Decide per file from its extension.
    #[default]
    Auto,
    Paired,
    Dimacs,
    Structured,
}

impl FormatChoice {
    /// The fixed format, or `None` for extension dispatch.
    #[must_use]
    pub const fn fixed(self) -> Option<GraphFormat> {
        match self {
            Self::Auto => None,
            Self::Paired => Some(GraphFormat::Paired),
            Self::Dimacs => Some(GraphFormat::Dimacs),
            Self::Structured => Some(GraphFormat::Structured),
        }
    }
}

impl From<Option<GraphFormat>> for FormatChoice {
    fn from(format: Option<GraphFormat>) -> Self {
        match format {
            None => Self::Auto,
            Some(GraphFormat::Paired) => Self::Paired,
            Some(GraphFormat::Dimacs) => Self::Dimacs,
            Some(GraphFormat::Structured) => Self::Structured,
        }
    }
}

/// Load a config file, returning defaults if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<LoaderConfig> {
    if !path.exists() {
        return Ok(LoaderConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<LoaderConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Path of the config file for a dataset directory.
#[must_use]
pub fn find_config(dataset_dir: &Path) -> PathBuf {
    dataset_dir.join(CONFIG_FILE_NAME)
}
