//! Domain layer for Flux search.
//!
//! Holds the document model, the query tokenizer, the configuration model and
//! the contracts every search backend implements. No I/O happens here.

pub mod config;
pub mod document;
pub mod error;
pub mod search;
pub mod tokenizer;
pub mod view;

// Re-export common types
pub use config::{SearchConfig, SearchMode};
pub use document::{Document, DocumentKind, SearchIndex};
pub use error::{Result, SearchError};
pub use search::MAX_RESULTS;
