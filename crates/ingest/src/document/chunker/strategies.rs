//! Depth-first traversal that turns the heading tree into merged chunks.

use crumbs_core::{ChunkerConfig, ContentOrder, Result, SemanticChunk, TreeElement};
use tracing::{debug, warn};

use super::helpers::merge_adjacent;
use crate::document::splitter::FallbackSplitter;
use crate::tokenizer::Tokenizer;

/// Post-order chunker over a [`TreeElement`] hierarchy.
pub struct PostOrderChunker<'a> {
    tokenizer: &'a dyn Tokenizer,
    splitter: &'a dyn FallbackSplitter,
    config: &'a ChunkerConfig,
}

impl<'a> PostOrderChunker<'a> {
    pub fn new(
        tokenizer: &'a dyn Tokenizer,
        splitter: &'a dyn FallbackSplitter,
        config: &'a ChunkerConfig,
    ) -> Self {
        Self {
            tokenizer,
            splitter,
            config,
        }
    }

    /// Chunk `node` and its subtree. `header_path` is the heading context of
    /// `node` itself (empty for the root).
    ///
    /// Children are processed first and their results concatenated in child
    /// order; the node's own text is then placed according to
    /// [`ContentOrder`] and the whole list goes through one greedy merge pass.
    /// Tokenizer failures abort the traversal.
    pub fn process(
        &self,
        node: &TreeElement,
        header_path: &[String],
    ) -> Result<Vec<SemanticChunk>> {
        let own = self.own_chunks(node, header_path)?;
        let mut chunks = Vec::new();

        if self.config.content_order == ContentOrder::ReadingOrder {
            chunks.extend(own.iter().cloned());
        }

        for child in &node.children {
            let mut child_path = header_path.to_vec();
            if let Some(header) = child.header.as_ref().filter(|h| !h.is_empty()) {
                child_path.push(header.clone());
            }
            chunks.extend(self.process(child, &child_path)?);
        }

        if self.config.content_order == ContentOrder::SubsectionsFirst {
            chunks.extend(own);
        }

        let before = chunks.len();
        let merged = merge_adjacent(chunks, self.config.max_tokens, self.tokenizer)?;
        if before > 1 {
            debug!(
                path = ?header_path,
                before,
                after = merged.len(),
                "merged node chunks"
            );
        }
        Ok(merged)
    }

    /// Chunks for the text a node owns directly.
    fn own_chunks(
        &self,
        node: &TreeElement,
        header_path: &[String],
    ) -> Result<Vec<SemanticChunk>> {
        if !node.has_content() {
            return Ok(Vec::new());
        }

        if node.token_length <= self.config.max_tokens {
            return Ok(vec![SemanticChunk::new(
                node.content.clone(),
                node.token_length,
                header_path.to_vec(),
                node.pages.clone(),
            )]);
        }

        if node.token_length < self.config.min_split_tokens {
            warn!(
                path = ?header_path,
                tokens = node.token_length,
                "dropping oversized fragment below the split threshold"
            );
            return Ok(Vec::new());
        }

        let groups = self
            .splitter
            .split(&node.content, self.config.chunk_size, self.config.overlap)?;
        debug!(
            path = ?header_path,
            tokens = node.token_length,
            groups = groups.len(),
            "split oversized content"
        );

        groups
            .into_iter()
            .map(|group| {
                let token_length = self.tokenizer.token_length(&group)?;
                Ok(SemanticChunk::new(
                    group,
                    token_length,
                    header_path.to_vec(),
                    node.pages.clone(),
                ))
            })
            .collect()
    }
}
