//! Search domain: query state, id sets and backend contracts.
//!
//! This module provides the pieces shared by every search mode:
//! - `model`: id sets and the observable query state
//! - `service`: the local index loader and remote strategy traits
//! - `cancellation`: racing network futures against a cancellation token

pub mod cancellation;
pub mod model;
pub mod service;

pub use cancellation::run_cancellable;
pub use model::{IdSet, SearchState, SearchStatus};
pub use service::{IndexLoader, RemoteQueryStrategy};

/// Maximum number of documents in a result set.
pub const MAX_RESULTS: usize = 15;
