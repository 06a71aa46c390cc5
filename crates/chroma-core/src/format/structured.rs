//! Structured (JSON layout) format parser.
//!
//! The source is a JSON array with one record per vertex:
//!
//! ```json
//! [
//!   { "id": 0, "conflict": [ { "id": 1 }, { "id": 2 } ] },
//!   { "id": "1", "conflict": [] },
//!   { "id": 2, "conflict": [ { "id": 0 } ] }
//! ]
//! ```
//!
//! Ids may be JSON integers or numeric strings. The matrix has one row per
//! record and every conflict is stored in both directions. The format has
//! no notion of a chromatic target, so [`DEFAULT_CHROMATIC_TARGET`] is used.

use std::io::BufRead;

use serde::Deserialize;
use tracing::instrument;

use crate::error::{InstanceError, Result};
use crate::instance::{DEFAULT_CHROMATIC_TARGET, GraphInstance};

#[derive(Debug, Deserialize)]
struct VertexRecord {
    id: Option<RecordId>,
    conflict: Option<Vec<ConflictRecord>>,
}

#[derive(Debug, Deserialize)]
struct ConflictRecord {
    id: Option<RecordId>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Index(i64),
    Text(String),
}

impl RecordId {
    fn resolve(&self, n: usize, source_id: &str) -> Result<usize> {
        let parsed = match self {
            Self::Index(i) => usize::try_from(*i).ok(),
            Self::Text(s) => s.trim().parse::<usize>().ok(),
        };
        match parsed {
            Some(id) if id < n => Ok(id),
            _ => Err(InstanceError::malformed(
                source_id,
                None,
                format!("vertex id {self:?} is not in 0..{n}"),
            )),
        }
    }
}

/// Parse a structured JSON source.
///
/// # Errors
///
/// - [`InstanceError::Json`] if the input is not a JSON array of objects.
/// - [`InstanceError::UnsupportedFormat`] if a record lacks `id` or
///   `conflict`, or a conflict entry lacks `id`.
/// - [`InstanceError::Malformed`] if an id is not a non-negative integer
///   below the record count.
#[instrument(skip(reader))]
pub fn parse_structured<R: BufRead>(reader: R, source_id: &str) -> Result<GraphInstance> {
    let records: Vec<VertexRecord> =
        serde_json::from_reader(reader).map_err(|source| InstanceError::Json {
            source_id: source_id.to_string(),
            source,
        })?;

    let n = records.len();
    let mut adjacency = GraphInstance::empty_adjacency(n);
    let missing = |field| InstanceError::UnsupportedFormat {
        source_id: source_id.to_string(),
        field,
    };

    for record in &records {
        let node = record.id.as_ref().ok_or_else(|| missing("id"))?.resolve(n, source_id)?;
        let conflicts = record.conflict.as_ref().ok_or_else(|| missing("conflict"))?;
        for conflict in conflicts {
            let neighbor = conflict
                .id
                .as_ref()
                .ok_or_else(|| missing("conflict.id"))?
                .resolve(n, source_id)?;
            adjacency[(node, neighbor)] = true;
            adjacency[(neighbor, node)] = true;
        }
    }

    Ok(GraphInstance::new(
        adjacency,
        DEFAULT_CHROMATIC_TARGET,
        None,
        source_id,
    ))
}
