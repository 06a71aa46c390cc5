//! `chroma inspect` — parse one instance file and report what was read.

use std::io::{self, Write};
use std::path::PathBuf;

use chroma_core::{GraphFormat, GraphInstance, load_instance};
use clap::Args;
use serde::Serialize;

use super::instance_cli_error;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_error, render_mode};

/// Arguments for `chroma inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Instance file to parse.
    pub path: PathBuf,

    /// Input format: paired, dimacs or structured.
    /// Defaults to the extension rule (.json → structured, else dimacs).
    #[arg(long, short = 'g')]
    pub graph_format: Option<GraphFormat>,
}

/// Report payload for `chroma inspect`.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub source: String,
    pub format: GraphFormat,
    pub vertices: usize,
    pub edges: usize,
    pub chromatic_target: usize,
    pub symmetric: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_edge: Option<[usize; 2]>,
    /// Edge count of the augmented variant, for paired files with a diff edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub augmented_edges: Option<usize>,
}

impl InspectReport {
    fn from_instance(instance: &GraphInstance, format: GraphFormat) -> Self {
        let augmented_edges = instance
            .diff_edge()
            .map(|(u, v)| instance.with_edge(u, v).edge_count());
        Self {
            source: instance.source_id().to_string(),
            format,
            vertices: instance.vertex_count(),
            edges: instance.edge_count(),
            chromatic_target: instance.chromatic_target(),
            symmetric: instance.is_symmetric(),
            diff_edge: instance.diff_edge().map(|(u, v)| [u, v]),
            augmented_edges,
        }
    }
}

/// Execute `chroma inspect`.
pub fn run_inspect(args: &InspectArgs, output: OutputMode) -> anyhow::Result<()> {
    let format = args
        .graph_format
        .unwrap_or_else(|| GraphFormat::from_path(&args.path));

    let instance = match load_instance(&args.path, format) {
        Ok(instance) => instance,
        Err(err) => {
            render_error(output, &instance_cli_error(&err))?;
            return Err(err.into());
        }
    };

    let report = InspectReport::from_instance(&instance, format);
    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &InspectReport, w: &mut dyn Write) -> io::Result<()> {
    let diff = report
        .diff_edge
        .map_or_else(|| "-".to_string(), |[u, v]| format!("{u}-{v}"));
    writeln!(
        w,
        "{}  {}  n={}  m={}  c={}  diff={}",
        report.source, report.format, report.vertices, report.edges, report.chromatic_target, diff
    )
}

fn render_pretty(report: &InspectReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &report.source)?;
    pretty_kv(w, "format", report.format.as_str())?;
    pretty_kv(w, "vertices", report.vertices.to_string())?;
    pretty_kv(w, "edges", report.edges.to_string())?;
    pretty_kv(w, "colors", report.chromatic_target.to_string())?;
    pretty_kv(w, "symmetric", if report.symmetric { "yes" } else { "no" })?;
    if let Some([u, v]) = report.diff_edge {
        pretty_kv(w, "diff edge", format!("{u} - {v}"))?;
    }
    if let Some(edges) = report.augmented_edges {
        pretty_kv(w, "augmented", edges.to_string())?;
    }
    Ok(())
}
