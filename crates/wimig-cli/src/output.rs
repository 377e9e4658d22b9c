//! Shared output layer for text/JSON parity across CLI commands.
//!
//! Text output is line oriented so it can be piped and grepped; JSON output
//! is a single pretty-printed document per command. Logs never go to stdout.

use serde::Serialize;
use std::io::{self, Write};
use wimig_core::ErrorCode;
use wimig_core::config::ConfigError;
use wimig_core::model::ContextError;
use wimig_core::model::export::ExportError;
use wimig_core::replay::ReplayError;

/// The output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Plain line-oriented text.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<T: Serialize>(w: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)?;
    Ok(())
}

/// Render to stdout: JSON in JSON mode, otherwise the `text` closure.
pub fn render<T, F>(mode: OutputMode, value: &T, text: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T, &mut dyn Write) -> io::Result<()>,
{
    let stdout = io::stdout();
    let mut w = stdout.lock();
    if mode.is_json() {
        write_json(&mut w, value)
    } else {
        text(value, &mut w)?;
        Ok(())
    }
}

/// Error payload rendered to stderr.
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    /// Full error chain on one line.
    pub message: String,
    /// Machine-readable code (e.g. `E1003`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Short summary of the code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// How to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// First [`ErrorCode`] found along the error chain.
pub fn error_code(err: &anyhow::Error) -> Option<ErrorCode> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<ReplayError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<ConfigError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<ExportError>() {
            Some(e.code())
        } else {
            cause.downcast_ref::<ContextError>().map(ContextError::code)
        }
    })
}

impl From<&anyhow::Error> for CliError {
    fn from(err: &anyhow::Error) -> Self {
        let code = error_code(err);
        Self {
            message: format!("{err:#}"),
            error_code: code.map(|c| c.code().to_string()),
            summary: code.map(|c| c.message().to_string()),
            suggestion: code.and_then(ErrorCode::hint).map(str::to_string),
        }
    }
}

/// Write an error in the requested format.
pub fn write_error(w: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    if mode.is_json() {
        return write_json(w, &serde_json::json!({ "error": error }));
    }
    match (&error.error_code, &error.summary) {
        (Some(code), Some(summary)) => writeln!(w, "error[{code}]: {summary}")?,
        _ => writeln!(w, "error: {}", error.message)?,
    }
    if error.error_code.is_some() {
        writeln!(w, "  {}", error.message)?;
    }
    if let Some(ref suggestion) = error.suggestion {
        writeln!(w, "  hint: {suggestion}")?;
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut w = stderr.lock();
    write_error(&mut w, mode, error)
}
