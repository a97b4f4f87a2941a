//! Output for CLI commands
//!
//! stdout carries exactly one line: the JSON summary of a successful run.
//! Failures produce one diagnostic line for stderr.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

use crate::errors::ProvisionError;

/// Serialize `data` as a single line of JSON
pub fn to_json_line<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string(data).context("Failed to serialize summary to JSON")
}

/// Print data as a single line of JSON on stdout
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let line = to_json_line(data)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", line).context("Failed to write summary")?;
    stdout.flush().context("Failed to flush stdout")
}

/// Single-line diagnostic for a failed run.
///
/// Failures the user cannot fix by changing input or credentials get a hint
/// to re-run with `--verbose`.
pub fn diagnostic(err: &anyhow::Error) -> String {
    let actionable = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ProvisionError>())
        .is_some_and(ProvisionError::is_user_actionable);
    let hint = if actionable { "" } else { " (re-run with --verbose for details)" };

    let message = format!("{:#}", err).replace('\n', " ");
    format!("{}: error: {}{}", crate::APP_NAME, message, hint)
}
