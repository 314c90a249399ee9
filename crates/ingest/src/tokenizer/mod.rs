mod traits;
mod whitespace;

#[cfg(feature = "hf-tokenizer")]
mod huggingface;

pub use traits::Tokenizer;
pub use whitespace::WhitespaceTokenizer;

#[cfg(feature = "hf-tokenizer")]
pub use huggingface::HfTokenizer;
