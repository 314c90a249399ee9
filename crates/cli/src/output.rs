//! Rendering of the chunk report to the output file.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

use crumbs_ingest::FormattedChunk;

use crate::cli::OutputFormat;

const RULE_WIDTH: usize = 80;

/// One numbered block per chunk, framed by rules, with its token count.
pub fn render_text(report: &[FormattedChunk]) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();
    for (i, chunk) in report.iter().enumerate() {
        let _ = write!(
            out,
            "\nChunk {}:\n{rule}\n{}\n{rule}\nToken length: {}\n",
            i + 1,
            chunk.text,
            chunk.token_length
        );
    }
    out
}

#[derive(Serialize)]
struct JsonChunk<'a> {
    index: usize,
    text: &'a str,
    token_length: usize,
    headers: &'a [String],
    pages: &'a BTreeSet<usize>,
}

/// Pretty-printed JSON array, indices starting at 1 like the text form.
pub fn render_json(report: &[FormattedChunk]) -> Result<String> {
    let entries: Vec<JsonChunk<'_>> = report
        .iter()
        .enumerate()
        .map(|(i, chunk)| JsonChunk {
            index: i + 1,
            text: &chunk.text,
            token_length: chunk.token_length,
            headers: &chunk.headers,
            pages: &chunk.pages,
        })
        .collect();
    let mut json = serde_json::to_string_pretty(&entries).context("failed to serialize chunks")?;
    json.push('\n');
    Ok(json)
}

pub fn write_report(path: &Path, report: &[FormattedChunk], format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => render_json(report)?,
    };
    debug!(?path, bytes = rendered.len(), "Writing output");
    std::fs::write(path, rendered)
        .with_context(|| format!("failed to write output: {}", path.display()))
}
