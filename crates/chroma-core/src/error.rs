//! Error taxonomy for instance parsing, sourcing, and batch assembly.
//!
//! Every variant that originates from a concrete input carries the
//! identifier of that input so callers can decide whether to skip it or
//! abort the run. Nothing here is retried automatically.

/// Convenience alias used throughout `chroma-core`.
pub type Result<T> = std::result::Result<T, InstanceError>;

/// Errors returned while turning raw sources into instances and batches.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    /// A required section marker or numeric token is missing or unparsable.
    #[error("malformed input in {source_id}{}: {reason}", fmt_line(.line))]
    Malformed {
        source_id: String,
        /// 1-based line number, when the failure is line-oriented.
        line: Option<usize>,
        reason: String,
    },

    /// A structured record is missing a field the loader relies on.
    #[error("unsupported record in {source_id}: missing field `{field}`")]
    UnsupportedFormat {
        source_id: String,
        field: &'static str,
    },

    /// Batch assembly was attempted on zero instances.
    #[error("cannot assemble a batch from zero instances")]
    EmptyBatch,

    /// An instance source was created without any identifiers.
    #[error("instance source has no identifiers")]
    EmptySource,

    /// Opening or reading a source failed.
    #[error("failed to read {source_id}: {source}")]
    Io {
        source_id: String,
        #[source]
        source: std::io::Error,
    },

    /// A structured source is not valid JSON.
    #[error("invalid JSON in {source_id}: {source}")]
    Json {
        source_id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl InstanceError {
    pub(crate) fn malformed(
        source_id: &str,
        line: Option<usize>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            source_id: source_id.to_string(),
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(source_id: &str, source: std::io::Error) -> Self {
        Self::Io {
            source_id: source_id.to_string(),
            source,
        }
    }

    /// Identifier of the input that caused this error, if any.
    #[must_use]
    pub fn source_id(&self) -> Option<&str> {
        match self {
            Self::Malformed { source_id, .. }
            | Self::UnsupportedFormat { source_id, .. }
            | Self::Io { source_id, .. }
            | Self::Json { source_id, .. } => Some(source_id),
            Self::EmptyBatch | Self::EmptySource => None,
        }
    }
}

#[allow(clippy::ref_option)]
fn fmt_line(line: &Option<usize>) -> String {
    line.map(|n| format!(" (line {n})")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::InstanceError;

    #[test]
    fn malformed_message_includes_line_when_known() {
        let err = InstanceError::malformed("g.col", Some(7), "bad edge");
        assert_eq!(err.to_string(), "malformed input in g.col (line 7): bad edge");

        let err = InstanceError::malformed("g.col", None, "no header");
        assert_eq!(err.to_string(), "malformed input in g.col: no header");
    }

    #[test]
    fn source_id_is_exposed_for_input_errors_only() {
        let err = InstanceError::UnsupportedFormat {
            source_id: "layout.json".into(),
            field: "id",
        };
        assert_eq!(err.source_id(), Some("layout.json"));
        assert_eq!(InstanceError::EmptyBatch.source_id(), None);
    }
}
