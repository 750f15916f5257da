//! Renders the inventory document on stdout. Logs go to stderr, so stdout
//! stays parseable.

use std::io::{self, Write};

use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(format: OutputFormat, doc: &Value, pretty: bool) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Json if pretty => serde_json::to_string_pretty(doc)?,
        OutputFormat::Json => serde_json::to_string(doc)?,
        OutputFormat::Yaml => serde_yaml::to_string(doc)?,
    };
    Ok(rendered)
}

pub fn print_output(output: &str) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", output.trim_end())?;
    Ok(())
}
