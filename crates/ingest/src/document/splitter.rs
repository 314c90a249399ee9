//! Sentence-level fallback splitting for sections that blow the token budget.

use std::sync::Arc;

use crumbs_core::Result;
use unicode_segmentation::UnicodeSegmentation;

use crate::tokenizer::Tokenizer;

/// Breaks oversized text into ordered, token-bounded groups.
pub trait FallbackSplitter: Send + Sync {
    /// Split `text` into groups of roughly `chunk_size` tokens. Consecutive
    /// groups may share up to `overlap` tokens.
    fn split(&self, text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>>;
}

/// Splits by paragraph, then sentence, then word, only descending when a
/// piece is still larger than the target, and packs the pieces greedily.
pub struct SentenceSplitter {
    tokenizer: Arc<dyn Tokenizer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Granularity {
    Paragraph,
    Sentence,
    Word,
}

/// A slice of the source text with its measured token count.
#[derive(Debug, Clone, Copy)]
struct Piece<'t> {
    text: &'t str,
    tokens: usize,
}

impl SentenceSplitter {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    fn collect_pieces<'t>(
        &self,
        text: &'t str,
        chunk_size: usize,
        granularity: Granularity,
        out: &mut Vec<Piece<'t>>,
    ) -> Result<()> {
        let tokens = self.tokenizer.token_length(text)?;
        if tokens <= chunk_size {
            out.push(Piece { text, tokens });
            return Ok(());
        }

        match granularity {
            Granularity::Paragraph => {
                for paragraph in text.split_inclusive("\n\n") {
                    self.collect_pieces(paragraph, chunk_size, Granularity::Sentence, out)?;
                }
            }
            Granularity::Sentence => {
                for sentence in text.split_sentence_bounds() {
                    self.collect_pieces(sentence, chunk_size, Granularity::Word, out)?;
                }
            }
            // Word bounds never cut through a token; a single word larger
            // than the target is kept whole.
            Granularity::Word => {
                for word in text.split_word_bounds() {
                    out.push(Piece {
                        text: word,
                        tokens: self.tokenizer.token_length(word)?,
                    });
                }
            }
        }
        Ok(())
    }
}

impl FallbackSplitter for SentenceSplitter {
    fn split(&self, text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let chunk_size = chunk_size.max(1);

        let mut pieces = Vec::new();
        self.collect_pieces(text, chunk_size, Granularity::Paragraph, &mut pieces)?;
        Ok(pack_pieces(&pieces, chunk_size, overlap))
    }
}

/// Greedy packing with a trailing overlap window carried into each new group.
fn pack_pieces(pieces: &[Piece<'_>], chunk_size: usize, overlap: usize) -> Vec<String> {
    let mut groups = Vec::new();
    let mut window: Vec<Piece<'_>> = Vec::new();
    let mut window_tokens = 0;
    // Whether the window holds text not already emitted in a previous group.
    let mut has_fresh = false;

    for piece in pieces {
        if has_fresh && window_tokens + piece.tokens > chunk_size {
            push_group(&mut groups, &window);

            let mut carried = 0;
            let mut keep = 0;
            for p in window.iter().rev() {
                if carried + p.tokens > overlap {
                    break;
                }
                carried += p.tokens;
                keep += 1;
            }
            window.drain(..window.len() - keep);
            window_tokens = carried;

            while !window.is_empty() && window_tokens + piece.tokens > chunk_size {
                let dropped = window.remove(0);
                window_tokens -= dropped.tokens;
            }
            has_fresh = false;
        }

        window.push(*piece);
        window_tokens += piece.tokens;
        has_fresh |= !piece.text.trim().is_empty();
    }

    if has_fresh {
        push_group(&mut groups, &window);
    }
    groups
}

fn push_group(groups: &mut Vec<String>, window: &[Piece<'_>]) {
    let joined: String = window.iter().map(|p| p.text).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        groups.push(trimmed.to_string());
    }
}
