//! Heading-aware, token-bounded chunking of markdown documents.
//!
//! The pipeline runs segmenter → tree builder → post-order chunker → formatter.
//! Each collaborator sits behind a trait so callers can swap tokenizers,
//! segmenters and fallback splitters without touching the core.

pub mod document;
pub mod tokenizer;

pub use document::chunker::{combine, merge_adjacent, PostOrderChunker};
pub use document::format::{format_chunk, header_breadcrumb, FormattedChunk};
pub use document::segment::{parse_heading, MarkdownSegmenter, SegmentSource};
pub use document::splitter::{FallbackSplitter, SentenceSplitter};
pub use document::tree::TreeBuilder;
pub use document::MarkdownChunker;
pub use tokenizer::{Tokenizer, WhitespaceTokenizer};

#[cfg(feature = "hf-tokenizer")]
pub use tokenizer::HfTokenizer;
