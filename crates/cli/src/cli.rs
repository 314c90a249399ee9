use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Split a markdown document into heading-aware, token-bounded chunks.
///
/// Each chunk carries the breadcrumb of headings it belongs to. Sections that
/// fit the budget are merged with their neighbours; oversized sections are
/// split at sentence boundaries.
#[derive(Parser, Debug)]
#[command(name = "crumbs", version, about)]
pub struct CliArgs {
    /// Markdown file to chunk
    #[arg(default_value = "input.md")]
    pub input: PathBuf,

    /// File the chunks are written to
    #[arg(short, long, default_value = "output.txt")]
    pub output: PathBuf,

    /// Token budget per chunk (overrides env and config file)
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Page-break delimiter; `\n` escapes are expanded
    #[arg(long)]
    pub page_break: Option<String>,

    /// Target group size when an oversized section is split
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Emit a section's own text before its subsections
    #[arg(long)]
    pub reading_order: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Path to a tokenizer.json vocabulary (defaults to whitespace word counts)
    #[arg(long, env = "CRUMBS_TOKENIZER")]
    pub tokenizer: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, env = "CRUMBS_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Numbered blocks with a token count per chunk
    Text,
    /// JSON array of chunk objects
    Json,
}
