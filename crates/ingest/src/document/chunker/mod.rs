//! Post-order chunking engine.
//!
//! Walks the heading tree depth-first, emits one chunk per node's own text
//! (falling back to sentence splitting when it is over budget), and greedily
//! merges adjacent chunks while the merged text still fits the token budget.

mod helpers;
mod strategies;

pub use helpers::{combine, merge_adjacent};
pub use strategies::PostOrderChunker;

#[cfg(test)]
mod tests;
