pub mod batches;
pub mod inspect;

use chroma_core::InstanceError;

use crate::output::CliError;

/// Map a core error onto a structured CLI error with a remediation hint.
pub fn instance_cli_error(err: &InstanceError) -> CliError {
    let (hint, error_code) = match err {
        InstanceError::Malformed { .. } => (
            "check the file against the selected --graph-format",
            "malformed_input",
        ),
        InstanceError::UnsupportedFormat { .. } => (
            "every record needs an `id` and a `conflict` list",
            "unsupported_format",
        ),
        InstanceError::Json { .. } => ("structured files must be a JSON array", "invalid_json"),
        InstanceError::Io { .. } => ("check the path and its permissions", "io_error"),
        InstanceError::EmptySource => ("add instance files to the dataset directory", "empty_dataset"),
        InstanceError::EmptyBatch => ("use a batch size of at least 1", "empty_batch"),
    };
    CliError {
        message: err.to_string(),
        hint,
        error_code,
    }
}
