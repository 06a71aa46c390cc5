//! `chroma batches` — stream batch summaries for a dataset directory.
//!
//! Settings come from `<DIR>/chroma.toml` (or `--config`), with command-line
//! flags taking precedence.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use chroma_core::config::{FormatChoice, LoaderConfig, SourceMode, find_config, load_config};
use chroma_core::{Batch, GraphFormat, InstanceSource};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

use super::instance_cli_error;
use crate::dataset::list_instance_files;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_error, render_mode};

/// Arguments for `chroma batches`.
#[derive(Args, Debug)]
pub struct BatchesArgs {
    /// Dataset directory.
    pub dir: PathBuf,

    /// Config file (defaults to `<DIR>/chroma.toml`).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Batch construction mode.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Pairs per batch in paired mode.
    #[arg(long, short = 'b')]
    pub batch_size: Option<usize>,

    /// Fixed shuffle seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Exact number of batches to produce, wrapping across epochs
    /// (defaults to one epoch).
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Input format for single mode (defaults to the extension rule).
    #[arg(long, short = 'g')]
    pub graph_format: Option<GraphFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Paired,
    Single,
}

impl From<ModeArg> for SourceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Paired => Self::Paired,
            ModeArg::Single => Self::Single,
        }
    }
}

/// Summary of one produced batch.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub index: usize,
    pub instances: usize,
    pub total_vertices: usize,
    pub total_edges: usize,
    pub total_colors: usize,
    pub sat_flags: Vec<u8>,
    pub last_source: String,
}

impl BatchSummary {
    fn new(index: usize, batch: &Batch) -> Self {
        Self {
            index,
            instances: batch.len(),
            total_vertices: batch.total_vertices(),
            total_edges: batch.total_edges(),
            total_colors: batch.total_colors(),
            sat_flags: batch.sat_flags.clone(),
            last_source: batch.last_source_id.clone(),
        }
    }
}

/// Report payload for `chroma batches`.
#[derive(Debug, Serialize)]
pub struct BatchesReport {
    pub dataset: String,
    pub files: usize,
    pub config: LoaderConfig,
    pub batches: Vec<BatchSummary>,
}

/// Merge flags over the file configuration.
fn effective_config(args: &BatchesArgs) -> Result<LoaderConfig> {
    let path = args.config.clone().unwrap_or_else(|| find_config(&args.dir));
    let mut config = load_config(&path)?;
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.graph_format.is_some() {
        config.format = FormatChoice::from(args.graph_format);
    }
    Ok(config)
}

/// Execute `chroma batches`.
pub fn run_batches(args: &BatchesArgs, output: OutputMode) -> Result<()> {
    let config = effective_config(args)?;
    let files = list_instance_files(&args.dir)?;
    let file_count = files.len();

    let source = match config.seed {
        Some(seed) => InstanceSource::with_seed(files, seed),
        None => InstanceSource::new(files),
    };
    let mut source = match source {
        Ok(source) => source,
        Err(err) => {
            render_error(output, &instance_cli_error(&err))?;
            return Err(err.into());
        }
    };

    info!(
        dataset = %args.dir.display(),
        files = file_count,
        mode = ?config.mode,
        batch_size = config.batch_size,
        "producing batches"
    );

    let format = config.format.fixed();
    let stream = match (config.mode, args.limit) {
        (SourceMode::Paired, Some(limit)) => source.test_batches(config.batch_size, limit),
        (SourceMode::Paired, None) => source.batches(config.batch_size),
        (SourceMode::Single, Some(limit)) => source.test_single_batches(format, limit),
        (SourceMode::Single, None) => source.single_batches(format),
    };

    let mut summaries = Vec::new();
    for (index, batch) in stream.enumerate() {
        match batch {
            Ok(batch) => summaries.push(BatchSummary::new(index, &batch)),
            Err(err) => {
                render_error(output, &instance_cli_error(&err))?;
                return Err(err.into());
            }
        }
    }

    let report = BatchesReport {
        dataset: args.dir.display().to_string(),
        files: file_count,
        config,
        batches: summaries,
    };
    render_mode(output, &report, render_text, render_pretty)
}

fn flags(sat_flags: &[u8]) -> String {
    sat_flags.iter().map(u8::to_string).collect()
}

fn render_text(report: &BatchesReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "index  instances  vertices  edges  colors  sat  last")?;
    for b in &report.batches {
        writeln!(
            w,
            "{}  {}  {}  {}  {}  {}  {}",
            b.index,
            b.instances,
            b.total_vertices,
            b.total_edges,
            b.total_colors,
            flags(&b.sat_flags),
            b.last_source
        )?;
    }
    Ok(())
}

fn render_pretty(report: &BatchesReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Dataset {}", report.dataset))?;
    pretty_kv(w, "files", report.files.to_string())?;
    pretty_kv(w, "mode", format!("{:?}", report.config.mode).to_lowercase())?;
    pretty_kv(w, "batch size", report.config.batch_size.to_string())?;
    pretty_kv(w, "batches", report.batches.len().to_string())?;
    for b in &report.batches {
        writeln!(w)?;
        pretty_section(w, &format!("Batch {}", b.index))?;
        pretty_kv(w, "instances", b.instances.to_string())?;
        pretty_kv(w, "vertices", b.total_vertices.to_string())?;
        pretty_kv(w, "edges", b.total_edges.to_string())?;
        pretty_kv(w, "colors", b.total_colors.to_string())?;
        pretty_kv(w, "sat flags", flags(&b.sat_flags))?;
        pretty_kv(w, "last source", &b.last_source)?;
    }
    Ok(())
}
