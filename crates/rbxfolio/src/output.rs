//! Output rendering.
//!
//! Documents go to stdout as JSON; diagnostics and logs go to stderr so
//! stdout stays machine-readable.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Serialize `data` in the chosen format.
pub fn render<T: Serialize + ?Sized>(format: OutputFormat, data: &T) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
    };
    Ok(rendered)
}

/// Render `data` and print it to stdout.
pub fn print<T: Serialize + ?Sized>(format: OutputFormat, data: &T) -> Result<(), CliError> {
    let rendered = render(format, data)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
