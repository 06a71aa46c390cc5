//! Paired-dataset format parser.
//!
//! # Layout
//!
//! ```text
//! NAME : example
//! DIMENSION 4
//! EDGE_DATA_SECTION
//! 0 1
//! 1 2
//! 2 3
//! -1
//! DIFF_EDGE
//! 0 2
//! CHROM_NUMBER
//! 3
//! ```
//!
//! Markers are located by a forward-only scan that starts at the line the
//! previous step stopped on, so arbitrary content between sections is
//! skipped. Edge lines set only the listed direction; the batch assembler
//! symmetrizes them later.
//!
//! `DIFF_EDGE` and `CHROM_NUMBER` may come in either order after the edge
//! section. `DIFF_EDGE` is optional: when `CHROM_NUMBER` comes first, the
//! rest of the input is still scanned for a trailing `DIFF_EDGE`, and only
//! reaching end of input without one means the instance has no diff edge.

use std::io::{BufRead, Lines};

use nalgebra::DMatrix;
use tracing::{instrument, trace};

use super::{parse_uint, parse_uints};
use crate::error::{InstanceError, Result};
use crate::instance::GraphInstance;

const DIMENSION: &str = "DIMENSION";
const EDGE_DATA_SECTION: &str = "EDGE_DATA_SECTION";
const EDGE_SENTINEL: &str = "-1";
const DIFF_EDGE: &str = "DIFF_EDGE";
const CHROM_NUMBER: &str = "CHROM_NUMBER";

/// Scan states, in the order the markers are expected.
enum ScanState {
    SeekDimension,
    SeekEdgeSection(DMatrix<bool>),
    Edges(DMatrix<bool>),
    SeekDiffEdge(DMatrix<bool>),
    SeekChromNumber(DMatrix<bool>, Option<(usize, usize)>),
    SeekTrailingDiffEdge(DMatrix<bool>, usize),
    Done(DMatrix<bool>, Option<(usize, usize)>, usize),
}

/// Forward-only line reader that remembers the line it stopped on.
struct LineCursor<'a, R> {
    lines: Lines<R>,
    current: String,
    line_no: usize,
    source_id: &'a str,
}

impl<'a, R: BufRead> LineCursor<'a, R> {
    fn new(reader: R, source_id: &'a str) -> Self {
        Self {
            lines: reader.lines(),
            current: String::new(),
            line_no: 0,
            source_id,
        }
    }

    /// Move to the next line. Returns `false` at end of input.
    fn advance(&mut self) -> Result<bool> {
        match self.lines.next() {
            Some(line) => {
                self.current = line.map_err(|e| InstanceError::io(self.source_id, e))?;
                self.line_no += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move to the next line, treating end of input as malformed.
    fn advance_required(&mut self, what: &str) -> Result<String> {
        if self.advance()? {
            Ok(self.current.clone())
        } else {
            Err(self.eof(what))
        }
    }

    /// Scan forward, starting at the current line, until a line contains
    /// one of `markers`. Returns the index of the marker that matched.
    fn seek_any(&mut self, markers: &[&str]) -> Result<usize> {
        loop {
            if let Some(hit) = markers.iter().position(|m| self.current.contains(m)) {
                return Ok(hit);
            }
            if !self.advance()? {
                return Err(self.eof(&markers.join(" or ")));
            }
        }
    }

    fn seek(&mut self, marker: &str) -> Result<()> {
        self.seek_any(&[marker]).map(|_| ())
    }

    /// Like [`seek`](Self::seek), but end of input yields `false`.
    fn seek_optional(&mut self, marker: &str) -> Result<bool> {
        loop {
            if self.current.contains(marker) {
                return Ok(true);
            }
            if !self.advance()? {
                return Ok(false);
            }
        }
    }

    fn eof(&self, what: &str) -> InstanceError {
        InstanceError::malformed(
            self.source_id,
            None,
            format!("reached end of input while looking for {what}"),
        )
    }

    fn malformed(&self, reason: impl Into<String>) -> InstanceError {
        InstanceError::malformed(self.source_id, Some(self.line_no), reason)
    }
}

/// Parse a paired-dataset source.
///
/// The returned instance is the base variant and carries the diff edge,
/// if any; use [`GraphInstance::into_pair`] to derive the augmented
/// variant.
///
/// # Errors
///
/// Returns [`InstanceError::Malformed`] if input ends before a required
/// marker, if a numeric token does not parse, or if an edge index lies
/// outside `0..DIMENSION`.
#[instrument(skip(reader))]
pub fn parse_paired<R: BufRead>(reader: R, source_id: &str) -> Result<GraphInstance> {
    let mut cursor = LineCursor::new(reader, source_id);
    let mut state = ScanState::SeekDimension;

    loop {
        state = match state {
            ScanState::SeekDimension => {
                cursor.seek(DIMENSION)?;
                let token = cursor.current.split_whitespace().nth(1).ok_or_else(|| {
                    cursor.malformed(format!("{DIMENSION} line has no vertex count"))
                })?;
                let n = parse_uint(token, source_id, cursor.line_no, "vertex count")?;
                trace!(n, "dimension");
                ScanState::SeekEdgeSection(GraphInstance::empty_adjacency(n))
            }
            ScanState::SeekEdgeSection(adjacency) => {
                cursor.seek(EDGE_DATA_SECTION)?;
                ScanState::Edges(adjacency)
            }
            ScanState::Edges(mut adjacency) => {
                let line = cursor.advance_required("the -1 edge sentinel")?;
                if line.contains(EDGE_SENTINEL) {
                    ScanState::SeekDiffEdge(adjacency)
                } else {
                    let [i, j] = parse_uints::<2>(&line, source_id, cursor.line_no, "edge")?;
                    check_bounds(&cursor, adjacency.nrows(), i, j)?;
                    adjacency[(i, j)] = true;
                    ScanState::Edges(adjacency)
                }
            }
            ScanState::SeekDiffEdge(adjacency) => {
                if cursor.seek_any(&[DIFF_EDGE, CHROM_NUMBER])? == 0 {
                    let diff_edge = read_diff_edge(&mut cursor, adjacency.nrows())?;
                    ScanState::SeekChromNumber(adjacency, Some(diff_edge))
                } else {
                    let target = read_chrom_number(&mut cursor)?;
                    ScanState::SeekTrailingDiffEdge(adjacency, target)
                }
            }
            ScanState::SeekChromNumber(adjacency, diff_edge) => {
                cursor.seek(CHROM_NUMBER)?;
                let target = read_chrom_number(&mut cursor)?;
                ScanState::Done(adjacency, diff_edge, target)
            }
            ScanState::SeekTrailingDiffEdge(adjacency, target) => {
                if cursor.seek_optional(DIFF_EDGE)? {
                    let diff_edge = read_diff_edge(&mut cursor, adjacency.nrows())?;
                    ScanState::Done(adjacency, Some(diff_edge), target)
                } else {
                    ScanState::Done(adjacency, None, target)
                }
            }
            ScanState::Done(adjacency, diff_edge, target) => {
                return Ok(GraphInstance::new(adjacency, target, diff_edge, source_id));
            }
        };
    }
}

/// Read the line after a `DIFF_EDGE` marker.
fn read_diff_edge<R: BufRead>(cursor: &mut LineCursor<'_, R>, n: usize) -> Result<(usize, usize)> {
    let line = cursor.advance_required("the diff edge")?;
    let [u, v] = parse_uints::<2>(&line, cursor.source_id, cursor.line_no, "diff edge")?;
    check_bounds(cursor, n, u, v)?;
    Ok((u, v))
}

/// Read the line after a `CHROM_NUMBER` marker.
fn read_chrom_number<R: BufRead>(cursor: &mut LineCursor<'_, R>) -> Result<usize> {
    let line = cursor.advance_required("the chromatic number")?;
    parse_uint(line.trim(), cursor.source_id, cursor.line_no, "chromatic number")
}

fn check_bounds<R: BufRead>(cursor: &LineCursor<'_, R>, n: usize, u: usize, v: usize) -> Result<()> {
    if u < n && v < n {
        Ok(())
    } else {
        Err(cursor.malformed(format!("edge ({u}, {v}) out of range for {n} vertices")))
    }
}
