//! DIMACS-style coloring format parser.
//!
//! ```text
//! c comment
//! p edge <nodes> <edges>
//! e <u> <v>          1-based, both directions are set
//! h <colors>         optional chromatic target
//! ```
//!
//! The declared edge count is read but never checked against the `e`
//! lines, and a missing `h` line falls back to
//! [`DEFAULT_CHROMATIC_TARGET`]. Self-loops are dropped silently.

use std::io::BufRead;

use tracing::{debug, instrument, warn};

use super::parse_uint;
use crate::error::{InstanceError, Result};
use crate::instance::{DEFAULT_CHROMATIC_TARGET, GraphInstance};

/// Parse a DIMACS-style source.
///
/// # Errors
///
/// Returns [`InstanceError::Malformed`] if an `e` line appears before the
/// `p` header, if a numeric field does not parse, or if an edge endpoint
/// falls outside `1..=nodes`.
#[instrument(skip(reader))]
pub fn parse_dimacs<R: BufRead>(reader: R, source_id: &str) -> Result<GraphInstance> {
    let mut adjacency = None;
    let mut chromatic_target = None;
    let mut declared_edges = 0usize;
    let mut observed_edges = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| InstanceError::io(source_id, e))?;
        let line_no = idx + 1;
        if line.starts_with('c') || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let field = |pos: usize, what: &str| -> Result<usize> {
            let token = fields.get(pos).ok_or_else(|| {
                InstanceError::malformed(source_id, Some(line_no), format!("missing {what}"))
            })?;
            parse_uint(token, source_id, line_no, what)
        };

        if line.starts_with('p') {
            let nodes = field(2, "node count")?;
            declared_edges = field(3, "edge count")?;
            if adjacency.is_some() {
                warn!(source_id, line_no, "repeated problem line; discarding earlier edges");
            }
            adjacency = Some(GraphInstance::empty_adjacency(nodes));
        } else if line.starts_with('e') {
            let Some(adj) = adjacency.as_mut() else {
                return Err(InstanceError::malformed(
                    source_id,
                    Some(line_no),
                    "edge line before problem line",
                ));
            };
            let n = adj.nrows();
            let u = to_zero_based(field(1, "edge endpoint")?, n, source_id, line_no)?;
            let v = to_zero_based(field(2, "edge endpoint")?, n, source_id, line_no)?;
            if u != v {
                adj[(u, v)] = true;
                adj[(v, u)] = true;
            }
            observed_edges += 1;
        } else if line.starts_with('h') {
            chromatic_target = Some(field(1, "chromatic target")?);
        }
    }

    let Some(adjacency) = adjacency else {
        return Err(InstanceError::malformed(source_id, None, "no problem line"));
    };
    if declared_edges != observed_edges {
        debug!(declared_edges, observed_edges, "edge count differs from header");
    }

    Ok(GraphInstance::new(
        adjacency,
        chromatic_target.unwrap_or(DEFAULT_CHROMATIC_TARGET),
        None,
        source_id,
    ))
}

fn to_zero_based(id: usize, n: usize, source_id: &str, line_no: usize) -> Result<usize> {
    if id == 0 || id > n {
        return Err(InstanceError::malformed(
            source_id,
            Some(line_no),
            format!("node {id} out of range 1..={n}"),
        ));
    }
    Ok(id - 1)
}
