//! Rendering of final chunks with their heading breadcrumb.

use std::collections::BTreeSet;

use crumbs_core::{Result, SemanticChunk};
use serde::Serialize;

use crate::tokenizer::Tokenizer;

pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// Join headings into a breadcrumb, skipping empty entries.
pub fn header_breadcrumb(headers: &[String]) -> String {
    headers
        .iter()
        .filter(|h| !h.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(BREADCRUMB_SEPARATOR)
}

/// Breadcrumb, blank line, then the content verbatim. Chunks without heading
/// context render as their content alone.
pub fn format_chunk(chunk: &SemanticChunk) -> String {
    if chunk.headers.is_empty() {
        return chunk.content.clone();
    }
    format!("{}\n\n{}", header_breadcrumb(&chunk.headers), chunk.content)
}

/// A rendered chunk together with the token count of the rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedChunk {
    pub text: String,
    pub token_length: usize,
    pub headers: Vec<String>,
    pub pages: BTreeSet<usize>,
}

impl FormattedChunk {
    pub fn new(chunk: &SemanticChunk, tokenizer: &dyn Tokenizer) -> Result<Self> {
        let text = format_chunk(chunk);
        let token_length = tokenizer.token_length(&text)?;
        Ok(Self {
            text,
            token_length,
            headers: chunk.headers.clone(),
            pages: chunk.pages.clone(),
        })
    }
}
