use std::path::Path;

use crumbs_core::{CrumbsError, Result};
use tracing::info;

use super::Tokenizer;

/// Tokenizer backed by a HuggingFace `tokenizer.json` vocabulary.
///
/// Loaded once at startup; a vocabulary that fails to load is fatal.
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
    name: String,
}

impl HfTokenizer {
    /// Read and parse a `tokenizer.json`. A missing or unreadable file is
    /// [`CrumbsError::Io`]; a file that is not a vocabulary is
    /// [`CrumbsError::Tokenizer`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let inner = tokenizers::Tokenizer::from_bytes(&bytes).map_err(|e| {
            CrumbsError::Tokenizer(format!("failed to load {}: {e}", path.display()))
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tokenizer.json".to_string());
        info!(path = %path.display(), "loaded tokenizer vocabulary");
        Ok(Self { inner, name })
    }
}

impl Tokenizer for HfTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let encoding = self.inner.encode(text, true).map_err(|e| {
            CrumbsError::Tokenizer(format!("{}: failed to encode text: {e}", self.name))
        })?;
        Ok(encoding.get_tokens().to_vec())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
