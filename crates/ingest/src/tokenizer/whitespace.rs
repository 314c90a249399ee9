use crumbs_core::Result;

use super::Tokenizer;

/// Counts whitespace-delimited words. Deterministic and vocabulary-free,
/// which makes it the tokenizer of choice for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        Ok(text.split_whitespace().map(str::to_string).collect())
    }

    fn token_length(&self, text: &str) -> Result<usize> {
        Ok(text.split_whitespace().count())
    }

    fn name(&self) -> &str {
        "whitespace"
    }
}
