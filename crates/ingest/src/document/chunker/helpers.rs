//! Chunk combination and greedy merging.

use crumbs_core::{Result, SemanticChunk};
use tracing::trace;

use crate::tokenizer::Tokenizer;

/// Render a heading line at the given 1-based depth.
fn heading_line(level: usize, header: &str) -> String {
    format!("{} {}", "#".repeat(level), header)
}

/// Push the headings of `chunk` below depth `prefix_len` as inline heading
/// lines, followed by its content.
fn push_with_unique_headers(parts: &mut Vec<String>, chunk: &SemanticChunk, prefix_len: usize) {
    for (offset, header) in chunk.headers[prefix_len..].iter().enumerate() {
        parts.push(heading_line(prefix_len + offset + 1, header));
    }
    parts.push(chunk.content.clone());
}

/// Combine two chunks into a merge candidate.
///
/// The candidate only claims the heading prefix both sides share; headings
/// below it are written inline so they are not lost. The token length is
/// measured on the combined text, never summed.
pub fn combine(
    a: &SemanticChunk,
    b: &SemanticChunk,
    tokenizer: &dyn Tokenizer,
) -> Result<SemanticChunk> {
    let prefix_len = a.common_prefix_len(b);

    let content = if a.headers == b.headers {
        format!("{}\n\n{}", a.content, b.content)
    } else {
        let mut parts = Vec::new();
        push_with_unique_headers(&mut parts, a, prefix_len);
        push_with_unique_headers(&mut parts, b, prefix_len);
        parts.join("\n\n")
    };

    let token_length = tokenizer.token_length(&content)?;
    Ok(SemanticChunk {
        content,
        token_length,
        headers: a.headers[..prefix_len].to_vec(),
        pages: a.pages.union(&b.pages).copied().collect(),
    })
}

/// Single left-to-right pass: keep folding the next chunk into the
/// accumulator while the combination fits `max_tokens`, otherwise flush.
pub fn merge_adjacent(
    chunks: Vec<SemanticChunk>,
    max_tokens: usize,
    tokenizer: &dyn Tokenizer,
) -> Result<Vec<SemanticChunk>> {
    let mut merged = Vec::with_capacity(chunks.len());
    let mut current: Option<SemanticChunk> = None;

    for chunk in chunks {
        current = Some(match current.take() {
            None => chunk,
            Some(acc) => {
                let candidate = combine(&acc, &chunk, tokenizer)?;
                if candidate.token_length <= max_tokens {
                    candidate
                } else {
                    trace!(
                        accumulated = acc.token_length,
                        next = chunk.token_length,
                        combined = candidate.token_length,
                        "merge rejected"
                    );
                    merged.push(acc);
                    chunk
                }
            }
        });
    }

    if let Some(last) = current {
        merged.push(last);
    }
    Ok(merged)
}
