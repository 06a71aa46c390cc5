//! On-disk graph formats and the dispatch between them.
//!
//! Three formats are understood:
//!
//! - [`GraphFormat::Paired`]: marker-delimited text with a `DIFF_EDGE`
//!   section, used to build SAT/UNSAT pairs ([`paired`]).
//! - [`GraphFormat::Dimacs`]: `p`/`e`/`h` line format ([`dimacs`]).
//! - [`GraphFormat::Structured`]: a JSON array of vertex records with
//!   `conflict` lists ([`structured`]).
//!
//! The caller always picks the format explicitly. The one exception is
//! [`GraphFormat::from_path`], which implements the documented extension
//! rule for non-paired datasets: `.json` files are structured, everything
//! else is DIMACS.

pub mod dimacs;
pub mod paired;
pub mod structured;

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{InstanceError, Result};
use crate::instance::GraphInstance;

pub use dimacs::parse_dimacs;
pub use paired::parse_paired;
pub use structured::parse_structured;

/// The closed set of supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    /// Paired-dataset marker format (`DIMENSION`, `EDGE_DATA_SECTION`, ...).
    Paired,
    /// DIMACS-style `p edge` / `e` / `h` lines.
    Dimacs,
    /// JSON vertex records with conflict lists.
    Structured,
}

impl GraphFormat {
    /// Pick a non-paired format from a file extension.
    ///
    /// `.json` (case-insensitive) selects [`GraphFormat::Structured`];
    /// any other extension, or none, selects [`GraphFormat::Dimacs`].
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::Structured
        } else {
            Self::Dimacs
        }
    }

    /// Parse `reader` as this format.
    ///
    /// # Errors
    ///
    /// Propagates the format parser's [`InstanceError`].
    pub fn parse<R: BufRead>(self, reader: R, source_id: &str) -> Result<GraphInstance> {
        match self {
            Self::Paired => parse_paired(reader, source_id),
            Self::Dimacs => parse_dimacs(reader, source_id),
            Self::Structured => parse_structured(reader, source_id),
        }
    }

    /// Stable lowercase name, as used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paired => "paired",
            Self::Dimacs => "dimacs",
            Self::Structured => "structured",
        }
    }
}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paired" => Ok(Self::Paired),
            "dimacs" | "col" => Ok(Self::Dimacs),
            "structured" | "json" => Ok(Self::Structured),
            other => Err(format!(
                "unknown graph format '{other}' (expected paired, dimacs or structured)"
            )),
        }
    }
}

/// Open `path` and parse it as `format`.
///
/// The path's display form becomes the instance's source identifier.
///
/// # Errors
///
/// Returns [`InstanceError::Io`] if the file cannot be opened, otherwise
/// whatever the format parser reports.
#[instrument(skip_all, fields(path = %path.display(), %format))]
pub fn load_instance(path: &Path, format: GraphFormat) -> Result<GraphInstance> {
    let source_id = path.display().to_string();
    let file = File::open(path).map_err(|e| InstanceError::io(&source_id, e))?;
    let instance = format.parse(BufReader::new(file), &source_id)?;
    debug!(
        vertices = instance.vertex_count(),
        edges = instance.edge_count(),
        colors = instance.chromatic_target(),
        "loaded instance"
    );
    Ok(instance)
}

/// Split a line on whitespace and parse exactly `N` unsigned integers.
pub(crate) fn parse_uints<const N: usize>(
    line: &str,
    source_id: &str,
    line_no: usize,
    what: &str,
) -> Result<[usize; N]> {
    let mut out = [0usize; N];
    let mut tokens = line.split_whitespace();
    for slot in &mut out {
        let token = tokens.next().ok_or_else(|| {
            InstanceError::malformed(
                source_id,
                Some(line_no),
                format!("expected {N} integers for {what}, got '{}'", line.trim()),
            )
        })?;
        *slot = parse_uint(token, source_id, line_no, what)?;
    }
    if tokens.next().is_some() {
        return Err(InstanceError::malformed(
            source_id,
            Some(line_no),
            format!("expected {N} integers for {what}, got '{}'", line.trim()),
        ));
    }
    Ok(out)
}

/// Parse one unsigned integer token.
pub(crate) fn parse_uint(token: &str, source_id: &str, line_no: usize, what: &str) -> Result<usize> {
    token.parse::<usize>().map_err(|_| {
        InstanceError::malformed(
            source_id,
            Some(line_no),
            format!("invalid {what}: '{token}'"),
        )
    })
}
