//! Block-diagonal batch assembly.
//!
//! # Overview
//!
//! [`assemble`] folds an ordered, non-empty run of [`GraphInstance`]s into a
//! single [`Batch`]:
//!
//! - `adjacency_block`: `V x V` where `V = sum(n_i)`. Instance `i` occupies
//!   the square `[n_acc_i, n_acc_i + n_i)` on the diagonal; everything
//!   outside those squares is zero.
//! - `color_candidates`: `V x C` where `C = sum(c_i)`. Instance `i` fills
//!   the rectangle `[n_acc_i, n_acc_i + n_i) x [c_acc_i, c_acc_i + c_i)`.
//!
//! Offsets are prefix sums over the input order. Entries are `1.0`/`0.0`
//! so the matrices can be handed to a numeric consumer unchanged.
//!
//! ## Symmetrization
//!
//! Paired-dataset instances arrive with one direction per edge. While
//! copying an instance into its block, both `(x, y)` and `(y, x)` are set
//! whenever either is set in the source, so the block is always symmetric.
//!
//! ## SAT labels
//!
//! With `paired_labeling` every instance is flagged 1. Otherwise the input
//! is read as interleaved `(base, augmented)` pairs from
//! [`InstanceSource`](crate::source::InstanceSource) and flagged by
//! position: even → 1 (SAT), odd → 0 (UNSAT). The augmented variant carries
//! one extra edge, so it is the one that may no longer be colorable.

use std::ops::Range;

use nalgebra::DMatrix;
use tracing::{debug, instrument};

use crate::error::{InstanceError, Result};
use crate::instance::GraphInstance;

/// Cell value for "edge present" / "candidate color".
const ON: f32 = 1.0;

/// A batch of instances ready for bulk numeric processing.
///
/// Field order mirrors the positional contract with downstream consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Block-diagonal, symmetric adjacency over all vertices in the batch.
    pub adjacency_block: DMatrix<f32>,
    /// Chromatic target of each instance, in input order.
    pub per_instance_colors: Vec<usize>,
    /// Vertex-to-candidate-color indicator, `total_vertices x total_colors`.
    pub color_candidates: DMatrix<f32>,
    /// 1 for SAT, 0 for UNSAT, one per instance.
    pub sat_flags: Vec<u8>,
    /// Vertex count of each instance, in input order.
    pub per_instance_vertex_counts: Vec<usize>,
    /// Edge count of each instance, in input order.
    pub per_instance_edge_counts: Vec<usize>,
    /// Source of the last instance folded in. Informational only.
    pub last_source_id: String,
}

/// Offset ranges of one instance inside a [`Batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRange {
    pub vertices: Range<usize>,
    pub colors: Range<usize>,
}

impl Batch {
    /// Number of instances in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.per_instance_colors.len()
    }

    /// Always `false`: [`assemble`] refuses empty input.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.per_instance_colors.is_empty()
    }

    #[must_use]
    pub fn total_vertices(&self) -> usize {
        self.per_instance_vertex_counts.iter().sum()
    }

    #[must_use]
    pub fn total_edges(&self) -> usize {
        self.per_instance_edge_counts.iter().sum()
    }

    #[must_use]
    pub fn total_colors(&self) -> usize {
        self.per_instance_colors.iter().sum()
    }

    /// Vertex and color offset ranges per instance, for un-batching.
    #[must_use]
    pub fn instance_ranges(&self) -> Vec<InstanceRange> {
        prefix_ranges(&self.per_instance_vertex_counts)
            .zip(prefix_ranges(&self.per_instance_colors))
            .map(|(vertices, colors)| InstanceRange { vertices, colors })
            .collect()
    }
}

/// Assemble `instances` into one [`Batch`].
///
/// No instance is modified; each is only read.
///
/// # Errors
///
/// Returns [`InstanceError::EmptyBatch`] if `instances` is empty.
#[instrument(skip(instances), fields(count = instances.len()))]
pub fn assemble(instances: &[GraphInstance], paired_labeling: bool) -> Result<Batch> {
    let last = instances.last().ok_or(InstanceError::EmptyBatch)?;

    let vertex_counts: Vec<usize> = instances.iter().map(GraphInstance::vertex_count).collect();
    let edge_counts: Vec<usize> = instances.iter().map(GraphInstance::edge_count).collect();
    let colors: Vec<usize> = instances
        .iter()
        .map(GraphInstance::chromatic_target)
        .collect();

    let total_vertices: usize = vertex_counts.iter().sum();
    let total_colors: usize = colors.iter().sum();

    let mut adjacency_block = DMatrix::<f32>::zeros(total_vertices, total_vertices);
    let mut color_candidates = DMatrix::<f32>::zeros(total_vertices, total_colors);

    let ranges = prefix_ranges(&vertex_counts).zip(prefix_ranges(&colors));
    for (instance, (vertices, color_range)) in instances.iter().zip(ranges) {
        let offset = vertices.start;
        let n = vertices.len();
        let adjacency = instance.adjacency();
        for x in 0..n {
            for y in 0..n {
                if adjacency[(x, y)] {
                    adjacency_block[(offset + x, offset + y)] = ON;
                    adjacency_block[(offset + y, offset + x)] = ON;
                }
            }
        }

        color_candidates
            .view_mut(
                (vertices.start, color_range.start),
                (vertices.len(), color_range.len()),
            )
            .fill(ON);
    }

    let sat_flags = (0..instances.len())
        .map(|i| u8::from(paired_labeling || i % 2 == 0))
        .collect();

    debug!(total_vertices, total_colors, "assembled batch");

    Ok(Batch {
        adjacency_block,
        per_instance_colors: colors,
        color_candidates,
        sat_flags,
        per_instance_vertex_counts: vertex_counts,
        per_instance_edge_counts: edge_counts,
        last_source_id: last.source_id().to_string(),
    })
}

/// Consecutive `[acc, acc + count)` ranges over `counts`.
fn prefix_ranges(counts: &[usize]) -> impl Iterator<Item = Range<usize>> + '_ {
    counts.iter().scan(0usize, |acc, &count| {
        let start = *acc;
        *acc += count;
        Some(start..*acc)
    })
}
