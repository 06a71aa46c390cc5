//! Output modes and rendering for `chroma` reports and errors.
//!
//! The mode comes from `--format` (or the hidden `--json`), then the
//! `FORMAT` environment variable, then the terminal: pretty on a TTY,
//! text when piped. Reports go to stdout; errors go to stderr.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

const SECTION_RULE_WIDTH: usize = 60;

/// Write a heading underlined with a dashed rule.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    writeln!(w, "{:-<width$}", "", width = SECTION_RULE_WIDTH)
}

/// Write an aligned `key: value` line.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<14} {}", format!("{key}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Sections and aligned key/value lines.
    Pretty,
    /// One line per record, for pipes.
    Text,
    Json,
}

fn pick_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }
    if json_flag {
        return OutputMode::Json;
    }
    let from_env = format_env.and_then(|val| OutputMode::from_str(val, true).ok());
    match from_env {
        Some(mode) => mode,
        None if is_tty => OutputMode::Pretty,
        None => OutputMode::Text,
    }
}

/// Resolve the output mode from flags, `FORMAT` and the terminal.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    pick_mode(
        format_flag,
        json_flag,
        env_val.as_deref(),
        io::stdout().is_terminal(),
    )
}

/// Write `value` to stdout as JSON or through the matching renderer.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// A failure reported to the user, with a remediation hint and a stable
/// machine-readable code.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    pub hint: &'static str,
    pub error_code: &'static str,
}

/// Write `error` to stderr; JSON mode wraps it as `{"error": {...}}`.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let mut out = io::stderr().lock();
    if mode == OutputMode::Json {
        serde_json::to_writer_pretty(&mut out, &serde_json::json!({ "error": error }))?;
        writeln!(out)?;
    } else {
        writeln!(out, "error: {}", error.message)?;
        writeln!(out, "  hint: {}", error.hint)?;
    }
    Ok(())
}
