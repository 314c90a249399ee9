use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CrumbsError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Defaults ──────────────────────────────────────────────────

pub const DEFAULT_MAX_TOKENS: usize = 500;
pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_OVERLAP: usize = 100;
/// Oversized content below this many tokens is dropped instead of split.
pub const DEFAULT_MIN_SPLIT_TOKENS: usize = 10;
/// A line holding exactly three hyphens.
pub const DEFAULT_PAGE_BREAK: &str = "\n---\n";

// ── Content order ─────────────────────────────────────────────

/// Where a node's own text lands relative to its subsections' chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentOrder {
    /// Subsection chunks first, then the node's own text.
    #[default]
    SubsectionsFirst,
    /// The node's own text first, as it appears in the document.
    ReadingOrder,
}

impl FromStr for ContentOrder {
    type Err = CrumbsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "subsections-first" => Ok(ContentOrder::SubsectionsFirst),
            "reading-order" => Ok(ContentOrder::ReadingOrder),
            other => Err(CrumbsError::Config(format!("unknown content order: {other}"))),
        }
    }
}

impl fmt::Display for ContentOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentOrder::SubsectionsFirst => f.write_str("subsections-first"),
            ContentOrder::ReadingOrder => f.write_str("reading-order"),
        }
    }
}

// ── Chunker config ────────────────────────────────────────────

/// Everything the chunking pipeline needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Token budget of a merged chunk.
    pub max_tokens: usize,
    /// Delimiter separating pages in the source document.
    pub page_break: String,
    /// Target group size for the fallback splitter.
    pub chunk_size: usize,
    /// Token overlap between consecutive fallback groups.
    pub overlap: usize,
    pub min_split_tokens: usize,
    pub content_order: ContentOrder,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            page_break: DEFAULT_PAGE_BREAK.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
            min_split_tokens: DEFAULT_MIN_SPLIT_TOKENS,
            content_order: ContentOrder::default(),
        }
    }
}

impl ChunkerConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CRUMBS_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_opt("CRUMBS_PROFILE").unwrap_or_default().to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let defaults = Self::default();
        Self {
            max_tokens: profiled_env_usize(p, "CRUMBS_MAX_TOKENS", defaults.max_tokens),
            page_break: profiled_env_opt(p, "CRUMBS_PAGE_BREAK")
                .map(|v| unescape_newlines(&v))
                .unwrap_or(defaults.page_break),
            chunk_size: profiled_env_usize(p, "CRUMBS_CHUNK_SIZE", defaults.chunk_size),
            content_order: profiled_env_opt(p, "CRUMBS_CONTENT_ORDER")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.content_order),
            ..defaults
        }
    }

    /// Reject combinations the pipeline cannot honour.
    pub fn validate(&self) -> Result<(), CrumbsError> {
        if self.max_tokens == 0 {
            return Err(CrumbsError::Config("max_tokens must be positive".into()));
        }
        if self.chunk_size == 0 {
            return Err(CrumbsError::Config("chunk_size must be positive".into()));
        }
        if self.overlap >= self.chunk_size {
            return Err(CrumbsError::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        if self.page_break.trim().is_empty() {
            return Err(CrumbsError::Config("page_break must not be blank".into()));
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!(
            max_tokens = self.max_tokens,
            chunk_size = self.chunk_size,
            overlap = self.overlap,
            page_break = ?self.page_break,
            content_order = %self.content_order,
            "chunker config loaded"
        );
    }
}

/// Env values and CLI flags cannot carry raw newlines comfortably; accept `\n` escapes.
pub fn unescape_newlines(value: &str) -> String {
    value.replace("\\n", "\n")
}
