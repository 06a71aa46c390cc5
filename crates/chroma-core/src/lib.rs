#![forbid(unsafe_code)]
//! chroma-core library.
//!
//! Turns graph-coloring instances on disk into batches for a learning
//! pipeline:
//!
//! 1. [`format`] parses paired-dataset, DIMACS-style and structured JSON
//!    files into [`GraphInstance`]s.
//! 2. [`source::InstanceSource`] cycles through a shuffled list of files,
//!    optionally expanding each into a SAT/UNSAT pair.
//! 3. [`batch::assemble`] packs a run of instances into a block-diagonal
//!    [`Batch`].
//!
//! # Conventions
//!
//! - **Errors**: [`InstanceError`] for parsing and assembly; `anyhow::Result`
//!   for configuration loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod batch;
pub mod config;
pub mod error;
pub mod format;
pub mod instance;
pub mod source;

pub use batch::{Batch, InstanceRange, assemble};
pub use error::{InstanceError, Result};
pub use format::{GraphFormat, load_instance};
pub use instance::{DEFAULT_CHROMATIC_TARGET, GraphInstance};
pub use source::{BatchMode, Batches, InstanceSource};
