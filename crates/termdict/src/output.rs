//! Rendering a word and its definitions for the terminal.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use termdict_core::Definition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Word on the first line, one `[part of speech] meaning` line per sense
    #[default]
    Text,
    /// Pretty-printed JSON object
    Json,
}

#[derive(Serialize)]
struct WordDefinitions<'a> {
    word: &'a str,
    definitions: &'a [Definition],
}

/// Print `defs` for `word`. In text format, `limit > 0` caps the number of
/// senses shown; JSON always carries every sense.
pub fn print_definitions(
    out: &mut dyn Write,
    format: OutputFormat,
    limit: usize,
    word: &str,
    defs: &[Definition],
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "{}", word)?;
            let shown = if limit == 0 { defs.len() } else { limit.min(defs.len()) };
            for def in &defs[..shown] {
                writeln!(out, "{}", def)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &WordDefinitions { word, definitions: defs })?;
            writeln!(out)?;
        }
    }
    Ok(())
}
