//! The normalized graph-coloring instance.
//!
//! # Overview
//!
//! A [`GraphInstance`] is one coloring problem: a square boolean adjacency
//! matrix over vertices `0..n`, a chromatic target, and an optional
//! "diff edge" linking it to its paired twin.
//!
//! ## Symmetry
//!
//! DIMACS and structured sources are symmetric as soon as they are parsed.
//! Paired-dataset sources only record the direction listed in the file;
//! symmetry for those is established when the instance is placed into a
//! [`Batch`](crate::batch::Batch). For that reason every counting helper
//! here treats a pair `{i, j}` as an edge when *either* direction is set.

use nalgebra::DMatrix;

/// Chromatic target assigned when a source does not declare one.
pub const DEFAULT_CHROMATIC_TARGET: usize = 10;

/// One graph-coloring problem instance.
///
/// Instances are immutable once returned from a parser; [`with_edge`]
/// produces an independent copy rather than mutating in place.
///
/// [`with_edge`]: GraphInstance::with_edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphInstance {
    adjacency: DMatrix<bool>,
    chromatic_target: usize,
    diff_edge: Option<(usize, usize)>,
    source_id: String,
}

impl GraphInstance {
    /// Build an instance from an already-populated adjacency matrix.
    ///
    /// Diagonal entries are cleared so the no-self-loop invariant holds
    /// regardless of what the caller passed in.
    ///
    /// # Panics
    ///
    /// Panics if `adjacency` is not square.
    #[must_use]
    pub fn new(
        mut adjacency: DMatrix<bool>,
        chromatic_target: usize,
        diff_edge: Option<(usize, usize)>,
        source_id: impl Into<String>,
    ) -> Self {
        assert!(adjacency.is_square(), "adjacency matrix must be square");
        for i in 0..adjacency.nrows() {
            adjacency[(i, i)] = false;
        }
        Self {
            adjacency,
            chromatic_target,
            diff_edge,
            source_id: source_id.into(),
        }
    }

    /// Empty `n x n` adjacency matrix.
    #[must_use]
    pub fn empty_adjacency(n: usize) -> DMatrix<bool> {
        DMatrix::from_element(n, n, false)
    }

    /// Raw adjacency matrix, exactly as parsed.
    #[must_use]
    pub const fn adjacency(&self) -> &DMatrix<bool> {
        &self.adjacency
    }

    /// Number of vertices `n`.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.nrows()
    }

    /// Number of unordered vertex pairs joined in at least one direction.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let n = self.vertex_count();
        (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.has_edge(i, j))
            .count()
    }

    /// Upper bound on usable colors for this instance.
    #[must_use]
    pub const fn chromatic_target(&self) -> usize {
        self.chromatic_target
    }

    /// The single edge separating the base variant from the augmented one, if any.
    #[must_use]
    pub const fn diff_edge(&self) -> Option<(usize, usize)> {
        self.diff_edge
    }

    /// Identifier of the file this instance came from.
    #[must_use]
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// `true` if `u` and `v` are joined in either direction.
    ///
    /// Out-of-range indices are reported as "no edge".
    #[must_use]
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        let n = self.vertex_count();
        u < n && v < n && (self.adjacency[(u, v)] || self.adjacency[(v, u)])
    }

    /// `true` if the stored matrix is already symmetric.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.adjacency == self.adjacency.transpose()
    }

    /// Return an independent copy with `(u, v)` and `(v, u)` both set.
    ///
    /// Setting an edge that is already present is a no-op on that cell,
    /// which keeps the augmented variant well defined when a source lists its
    /// diff edge in the base edge list as well. Self-loops are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `u` or `v` is out of range; parsers validate diff edges
    /// before calling this.
    #[must_use]
    pub fn with_edge(&self, u: usize, v: usize) -> Self {
        let mut copy = self.clone();
        if u != v {
            copy.adjacency[(u, v)] = true;
            copy.adjacency[(v, u)] = true;
        }
        copy
    }

    /// Split a paired-dataset instance into its `(base, augmented)` variants.
    ///
    /// The augmented variant has the diff edge set in both directions; the
    /// base variant is the parsed matrix untouched. Without a diff edge both
    /// variants are identical copies.
    #[must_use]
    pub fn into_pair(self) -> (Self, Self) {
        let augmented = match self.diff_edge {
            Some((u, v)) => self.with_edge(u, v),
            None => self.clone(),
        };
        (self, augmented)
    }
}
