pub mod chunker;
pub mod format;
pub mod segment;
pub mod splitter;
pub mod tree;

use std::sync::Arc;

use crumbs_core::{ChunkerConfig, Result, SemanticChunk, TreeElement};
use tracing::info;

use self::chunker::PostOrderChunker;
use self::format::{format_chunk, FormattedChunk};
use self::segment::{MarkdownSegmenter, SegmentSource};
use self::splitter::{FallbackSplitter, SentenceSplitter};
use self::tree::TreeBuilder;
use crate::tokenizer::Tokenizer;

/// End-to-end pipeline: segment, build the heading tree, chunk, format.
///
/// Holds its collaborators behind `Arc` so one instance can be shared; every
/// call is independent of the previous ones.
#[derive(Clone)]
pub struct MarkdownChunker {
    config: ChunkerConfig,
    tokenizer: Arc<dyn Tokenizer>,
    segmenter: Arc<dyn SegmentSource>,
    splitter: Arc<dyn FallbackSplitter>,
}

impl MarkdownChunker {
    /// Pipeline with the markdown segmenter and a sentence splitter that
    /// measures with the same tokenizer.
    pub fn new(config: ChunkerConfig, tokenizer: Arc<dyn Tokenizer>) -> Self {
        let splitter = Arc::new(SentenceSplitter::new(Arc::clone(&tokenizer)));
        Self {
            config,
            tokenizer,
            segmenter: Arc::new(MarkdownSegmenter),
            splitter,
        }
    }

    pub fn with_segmenter(mut self, segmenter: Arc<dyn SegmentSource>) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn with_splitter(mut self, splitter: Arc<dyn FallbackSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    /// Build the heading tree for `text`.
    pub fn parse_tree(&self, text: &str) -> Result<TreeElement> {
        TreeBuilder::new(
            self.segmenter.as_ref(),
            self.tokenizer.as_ref(),
            &self.config.page_break,
        )
        .build(text)
    }

    /// Chunk an already-built tree.
    pub fn process_tree(&self, root: &TreeElement) -> Result<Vec<SemanticChunk>> {
        PostOrderChunker::new(
            self.tokenizer.as_ref(),
            self.splitter.as_ref(),
            &self.config,
        )
        .process(root, &[])
    }

    /// Parse and chunk `text`.
    pub fn semantic_chunks(&self, text: &str) -> Result<Vec<SemanticChunk>> {
        let root = self.parse_tree(text)?;
        let chunks = self.process_tree(&root)?;
        info!(
            chunks = chunks.len(),
            tokenizer = self.tokenizer.name(),
            max_tokens = self.config.max_tokens,
            "chunked document"
        );
        Ok(chunks)
    }

    /// Parse, chunk and render `text` with breadcrumb headers.
    pub fn formatted_chunks(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.semantic_chunks(text)?.iter().map(format_chunk).collect())
    }

    /// Rendered chunks with the token length of each rendered text.
    pub fn report(&self, text: &str) -> Result<Vec<FormattedChunk>> {
        self.semantic_chunks(text)?
            .iter()
            .map(|chunk| FormattedChunk::new(chunk, self.tokenizer.as_ref()))
            .collect()
    }
}
