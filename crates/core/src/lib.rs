pub mod config;
pub mod document;
pub mod error;

pub use config::{ChunkerConfig, ContentOrder};
pub use document::*;
pub use error::*;
