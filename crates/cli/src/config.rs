use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crumbs_core::config::{load_dotenv, unescape_newlines};
use crumbs_core::{ChunkerConfig, ContentOrder};
use crumbs_ingest::{Tokenizer, WhitespaceTokenizer};

use crate::cli::CliArgs;

/// Optional overrides loaded from a TOML file. Every key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub max_tokens: Option<usize>,
    pub page_break: Option<String>,
    pub chunk_size: Option<usize>,
    pub content_order: Option<ContentOrder>,
    /// Path to a tokenizer.json vocabulary
    pub tokenizer: Option<PathBuf>,
}

impl FileConfig {
    /// Load the config file at `path`, or an empty config when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        debug!(?path, "Loading config");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    fn apply(&self, config: &mut ChunkerConfig) {
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(page_break) = &self.page_break {
            config.page_break = page_break.clone();
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(order) = self.content_order {
            config.content_order = order;
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub chunker: ChunkerConfig,
    pub tokenizer: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings. Priority: CLI flags > config file > env > defaults.
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        load_dotenv();
        let mut chunker = ChunkerConfig::from_env();

        let file = FileConfig::load(args.config.as_deref())?;
        file.apply(&mut chunker);

        if let Some(max_tokens) = args.max_tokens {
            chunker.max_tokens = max_tokens;
        }
        if let Some(page_break) = &args.page_break {
            chunker.page_break = unescape_newlines(page_break);
        }
        if let Some(chunk_size) = args.chunk_size {
            chunker.chunk_size = chunk_size;
        }
        if args.reading_order {
            chunker.content_order = ContentOrder::ReadingOrder;
        }

        chunker.validate()?;

        Ok(Self {
            chunker,
            tokenizer: args.tokenizer.clone().or(file.tokenizer),
        })
    }
}

/// Load the tokenizer once at startup. A vocabulary that fails to load is fatal.
pub fn build_tokenizer(path: Option<&Path>) -> Result<Arc<dyn Tokenizer>> {
    match path {
        None => {
            info!("no tokenizer vocabulary given, counting whitespace-delimited words");
            Ok(Arc::new(WhitespaceTokenizer))
        }
        Some(path) => load_vocabulary(path),
    }
}

#[cfg(feature = "hf-tokenizer")]
fn load_vocabulary(path: &Path) -> Result<Arc<dyn Tokenizer>> {
    let tokenizer = crumbs_ingest::HfTokenizer::from_file(path)?;
    Ok(Arc::new(tokenizer))
}

#[cfg(not(feature = "hf-tokenizer"))]
fn load_vocabulary(path: &Path) -> Result<Arc<dyn Tokenizer>> {
    anyhow::bail!(
        "cannot load {}: built without the `hf-tokenizer` feature",
        path.display()
    )
}
