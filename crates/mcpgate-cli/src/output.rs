// mcpgate-cli/src/output.rs
// ============================================================================
// Module: Output Helpers
// Description: stdout/stderr writers and the shared `--format json|text`
//              value enum. JSON-emitting commands write exactly one
//              document to stdout and signal outcome through the exit code
//              alone (spec.md §6/§7).
// ============================================================================

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::CliResult;

/// Output mode shared by commands that can render either a JSON document or
/// a human-readable summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Canonical JSON document on stdout.
    Json,
    /// Human-readable text banner on stdout.
    Text,
}

/// Writes `message` to stdout followed by a newline.
pub fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes `message` to stderr followed by a newline.
pub fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Serializes `value` as pretty JSON and writes it to stdout as the
/// command's sole output document.
///
/// # Errors
///
/// Returns [`crate::error::CliError`] when serialization or the write fails.
pub fn emit_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| crate::error::CliError::new(mcpgate_core::ErrorKind::Parse, err.to_string()))?;
    write_stdout_line(&text)?;
    Ok(())
}
