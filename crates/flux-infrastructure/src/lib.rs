//! Infrastructure layer for Flux search.
//!
//! Local index loading and caching, and configuration file handling.

pub mod config_service;
pub mod index_loader;
pub mod local_index;

pub use crate::config_service::{ConfigService, default_config_path};
pub use crate::index_loader::{FileIndexLoader, HttpIndexLoader, loader_from_config};
pub use crate::local_index::LocalIndexStore;
