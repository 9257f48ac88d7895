//! CLI command for inspecting a saved population.

use crate::cli::output::{self, LineageReport};
use crate::cli::{CliError, OutputFormat};
use genetics::persistence::load_population;
use std::path::Path;

/// Execute the inspect command.
///
/// Payloads are read as raw JSON, so any saved population can be inspected
/// regardless of the candidate type that wrote it.
pub(crate) fn execute(path: &Path, format: OutputFormat) -> Result<(), CliError> {
    let population = load_population::<serde_json::Value>(path)?;
    let report = LineageReport::new(&population);

    match format {
        OutputFormat::Text => print!("{}", output::format_lineage_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
