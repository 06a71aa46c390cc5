//! Cyclic, shuffled instance source.
//!
//! # Overview
//!
//! [`InstanceSource`] owns an ordered list of instance identifiers (file
//! paths handed over by whatever lists the dataset directory), a cursor,
//! and an RNG. Each `next_*` call parses the identifier under the cursor
//! and then advances. Running off the end reshuffles and starts over, so
//! the source never runs dry; epochs are implicit.
//!
//! The cursor only moves after a successful parse. A caller that wants to
//! step past a broken file calls [`InstanceSource::skip`]. Batch draws are
//! all-or-nothing: a failure part way through a paired batch rolls the
//! source back to where the batch started.
//!
//! ## Concurrency
//!
//! All state is owned and mutated through `&mut self`. Share one source
//! between workers behind a `Mutex`, or give each worker its own source
//! over a disjoint slice of identifiers.
//!
//! ## Batch streams
//!
//! [`batches`], [`test_batches`], [`single_batches`] and
//! [`test_single_batches`] wrap the `next_*` calls and [`assemble`] into
//! iterators of `Result<Batch>`.
//!
//! [`batches`]: InstanceSource::batches
//! [`test_batches`]: InstanceSource::test_batches
//! [`single_batches`]: InstanceSource::single_batches
//! [`test_single_batches`]: InstanceSource::test_single_batches

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument, warn};

use crate::batch::{Batch, assemble};
use crate::error::{InstanceError, Result};
use crate::format::{GraphFormat, load_instance};
use crate::instance::GraphInstance;

/// Shuffled, endlessly cycling collection of instance identifiers.
#[derive(Debug)]
pub struct InstanceSource {
    identifiers: Vec<PathBuf>,
    cursor: usize,
    epoch: u64,
    rng: StdRng,
}

impl InstanceSource {
    /// Create a source over `identifiers`, shuffled with an entropy-seeded RNG.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::EmptySource`] if `identifiers` is empty.
    pub fn new(identifiers: Vec<PathBuf>) -> Result<Self> {
        Self::with_rng(identifiers, StdRng::from_entropy())
    }

    /// Create a source whose shuffles are reproducible from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::EmptySource`] if `identifiers` is empty.
    pub fn with_seed(identifiers: Vec<PathBuf>, seed: u64) -> Result<Self> {
        Self::with_rng(identifiers, StdRng::seed_from_u64(seed))
    }

    fn with_rng(identifiers: Vec<PathBuf>, rng: StdRng) -> Result<Self> {
        if identifiers.is_empty() {
            return Err(InstanceError::EmptySource);
        }
        let mut source = Self {
            identifiers,
            cursor: 0,
            epoch: 0,
            rng,
        };
        source.shuffle();
        Ok(source)
    }

    /// Number of identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    /// Always `false`; construction rejects empty identifier lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// Identifiers in their current (shuffled) order.
    #[must_use]
    pub fn identifiers(&self) -> &[PathBuf] {
        &self.identifiers
    }

    /// The identifier the next call will read.
    #[must_use]
    pub fn current(&self) -> &Path {
        &self.identifiers[self.cursor]
    }

    /// Number of completed passes over the identifiers.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Reshuffle and move the cursor back to the start.
    pub fn reset(&mut self) {
        self.shuffle();
        self.cursor = 0;
    }

    /// Advance past the current identifier without parsing it.
    pub fn skip(&mut self) {
        warn!(path = %self.current().display(), "skipping instance");
        self.advance();
    }

    /// Parse the current identifier as a paired-dataset file and return
    /// its `(base, augmented)` variants.
    ///
    /// The augmented variant has the diff edge set in both directions;
    /// without a diff edge both variants are identical copies.
    ///
    /// # Errors
    ///
    /// Propagates the parse error; the cursor is left in place.
    #[instrument(skip(self), fields(cursor = self.cursor))]
    pub fn next_paired_pair(&mut self) -> Result<(GraphInstance, GraphInstance)> {
        let base = load_instance(self.current(), GraphFormat::Paired)?;
        self.advance();
        Ok(base.into_pair())
    }

    /// Parse the current identifier with `format`.
    ///
    /// # Errors
    ///
    /// Propagates the parse error; the cursor is left in place.
    #[instrument(skip(self), fields(cursor = self.cursor))]
    pub fn next_single(&mut self, format: GraphFormat) -> Result<GraphInstance> {
        let instance = load_instance(self.current(), format)?;
        self.advance();
        Ok(instance)
    }

    /// Like [`next_single`](Self::next_single), choosing the format from the
    /// file extension (`.json` → structured, otherwise DIMACS).
    ///
    /// # Errors
    ///
    /// Propagates the parse error; the cursor is left in place.
    pub fn next_single_auto(&mut self) -> Result<GraphInstance> {
        let format = GraphFormat::from_path(self.current());
        self.next_single(format)
    }

    /// Draw `pairs` paired instances and assemble them, interleaved
    /// `base, augmented, base, augmented, ...`, into one batch.
    ///
    /// # Errors
    ///
    /// Propagates parse errors, and [`InstanceError::EmptyBatch`] when
    /// `pairs` is zero. On error the source is left exactly as it was
    /// before the call: cursor, epoch, order and RNG state.
    pub fn paired_batch(&mut self, pairs: usize) -> Result<Batch> {
        let checkpoint = self.checkpoint();
        let mut instances = Vec::with_capacity(pairs * 2);
        for _ in 0..pairs {
            match self.next_paired_pair() {
                Ok((base, augmented)) => {
                    instances.push(base);
                    instances.push(augmented);
                }
                Err(err) => {
                    debug!(parsed = instances.len() / 2, "paired batch failed; rolling back");
                    self.restore(checkpoint);
                    return Err(err);
                }
            }
        }
        assemble(&instances, false)
    }

    /// One epoch of paired batches: `len / pairs` batches of `pairs` pairs.
    pub fn batches(&mut self, pairs: usize) -> Batches<'_> {
        let count = self.len().checked_div(pairs).unwrap_or(0);
        Batches::new(self, BatchMode::Paired { pairs }, count)
    }

    /// Exactly `total` paired batches of `pairs` pairs each.
    pub fn test_batches(&mut self, pairs: usize, total: usize) -> Batches<'_> {
        Batches::new(self, BatchMode::Paired { pairs }, total)
    }

    /// Exactly `total` single-instance batches, wrapping across epochs.
    ///
    /// `None` selects the format per file from its extension.
    pub fn test_single_batches(&mut self, format: Option<GraphFormat>, total: usize) -> Batches<'_> {
        Batches::new(self, BatchMode::Single { format }, total)
    }

    /// One single-instance batch per identifier, all labelled SAT.
    ///
    /// `None` selects the format per file from its extension.
    pub fn single_batches(&mut self, format: Option<GraphFormat>) -> Batches<'_> {
        let count = self.len();
        Batches::new(self, BatchMode::Single { format }, count)
    }

    fn advance(&mut self) {
        if self.cursor + 1 < self.identifiers.len() {
            self.cursor += 1;
        } else {
            self.epoch += 1;
            debug!(epoch = self.epoch, "end of identifiers; reshuffling");
            self.reset();
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            identifiers: self.identifiers.clone(),
            cursor: self.cursor,
            epoch: self.epoch,
            rng: self.rng.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.identifiers = checkpoint.identifiers;
        self.cursor = checkpoint.cursor;
        self.epoch = checkpoint.epoch;
        self.rng = checkpoint.rng;
    }

    fn shuffle(&mut self) {
        self.identifiers.shuffle(&mut self.rng);
    }
}

/// Saved source state; a batch may reshuffle mid-draw when it wraps.
struct Checkpoint {
    identifiers: Vec<PathBuf>,
    cursor: usize,
    epoch: u64,
    rng: StdRng,
}

/// How a [`Batches`] stream builds each batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// `pairs` `(base, augmented)` pairs per batch, position-labelled.
    Paired { pairs: usize },
    /// One instance per batch, labelled SAT.
    Single { format: Option<GraphFormat> },
}

/// A finite stream of batches drawn from an [`InstanceSource`].
///
/// A parse failure is yielded as an `Err` item and counts toward the
/// stream length. The source does not move past a failed batch.
#[derive(Debug)]
pub struct Batches<'a> {
    source: &'a mut InstanceSource,
    mode: BatchMode,
    remaining: usize,
}

impl<'a> Batches<'a> {
    const fn new(source: &'a mut InstanceSource, mode: BatchMode, count: usize) -> Self {
        Self {
            source,
            mode,
            remaining: count,
        }
    }
}

impl Iterator for Batches<'_> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(match self.mode {
            BatchMode::Paired { pairs } => self.source.paired_batch(pairs),
            BatchMode::Single { format } => {
                let instance = match format {
                    Some(format) => self.source.next_single(format),
                    None => self.source.next_single_auto(),
                };
                instance.and_then(|g| assemble(std::slice::from_ref(&g), true))
            }
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Batches<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identifier_list_is_rejected() {
        assert!(matches!(
            InstanceSource::new(Vec::new()),
            Err(InstanceError::EmptySource)
        ));
    }

    #[test]
    fn seeded_sources_shuffle_identically() {
        let ids: Vec<PathBuf> = (0..20).map(|i| PathBuf::from(format!("g{i}.txt"))).collect();
        let a = InstanceSource::with_seed(ids.clone(), 7).expect("non-empty");
        let b = InstanceSource::with_seed(ids.clone(), 7).expect("non-empty");
        assert_eq!(a.identifiers(), b.identifiers());

        let mut sorted = a.identifiers().to_vec();
        sorted.sort();
        let mut expected = ids;
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn skip_wraps_and_counts_epochs() {
        let ids: Vec<PathBuf> = (0..3).map(|i| PathBuf::from(format!("g{i}"))).collect();
        let mut source = InstanceSource::with_seed(ids, 1).expect("non-empty");
        for _ in 0..7 {
            source.skip();
        }
        assert_eq!(source.epoch(), 2);
        assert_eq!(source.len(), 3);
    }

    #[test]
    fn failed_parse_leaves_cursor_in_place() {
        let ids = vec![PathBuf::from("/nonexistent/a"), PathBuf::from("/nonexistent/b")];
        let mut source = InstanceSource::with_seed(ids, 3).expect("non-empty");
        let before = source.current().to_path_buf();
        let err = source.next_single(GraphFormat::Dimacs).expect_err("missing file");
        assert!(matches!(err, InstanceError::Io { .. }));
        assert_eq!(source.current(), before.as_path());
    }

    #[test]
    fn epoch_batches_round_down() {
        let ids: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("g{i}"))).collect();
        let mut source = InstanceSource::with_seed(ids, 1).expect("non-empty");
        assert_eq!(source.batches(2).len(), 2);
        assert_eq!(source.batches(0).len(), 0);
        assert_eq!(source.test_batches(2, 9).len(), 9);
        assert_eq!(source.single_batches(None).len(), 5);
        assert_eq!(source.test_single_batches(None, 12).len(), 12);
    }
}
