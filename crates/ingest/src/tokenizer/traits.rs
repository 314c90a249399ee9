use crumbs_core::Result;

/// Token-counting oracle used for leaf sizing, fallback splitting and
/// re-measuring merged chunks.
///
/// Implementations must be deterministic for a fixed vocabulary. A text the
/// tokenizer cannot encode is an error, never a zero count.
pub trait Tokenizer: Send + Sync {
    /// Split `text` into its tokens, in order.
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;

    /// Number of tokens in `text`.
    fn token_length(&self, text: &str) -> Result<usize> {
        Ok(self.tokenize(text)?.len())
    }

    /// Short label for logs.
    fn name(&self) -> &str;
}
