mod cli;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crumbs_ingest::MarkdownChunker;

use crate::cli::CliArgs;
use crate::config::{build_tokenizer, Settings};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let settings = Settings::resolve(&args).context("failed to load configuration")?;
    settings.chunker.log_summary();

    let tokenizer = build_tokenizer(settings.tokenizer.as_deref())
        .context("failed to load tokenizer")?;

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read input: {}", args.input.display()))?;
    info!(input = %args.input.display(), bytes = text.len(), "Read document");

    let chunker = MarkdownChunker::new(settings.chunker, tokenizer);
    let report = chunker
        .report(&text)
        .with_context(|| format!("failed to chunk {}", args.input.display()))?;

    output::write_report(&args.output, &report, args.format)?;
    println!("Output saved to {}", args.output.display());

    Ok(())
}
